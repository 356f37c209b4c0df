/// Schema version of the persisted `RaidenState` produced by this crate.
pub const CURRENT_STATE_VERSION: u32 = 6;

/// Separates partner and token network in a `ChannelKey`.
pub const CHANNEL_KEY_SEPARATOR: char = '@';

/// Separates the channel identifier from the `ChannelKey` in `oldChannels`.
pub const CHANNEL_UNIQUE_KEY_SEPARATOR: char = '#';
