pub const COOLDOWN_WINDOW_SECS: u64 = 24 * 60 * 60;

pub const SECS_PER_HOUR: u64 = 60 * 60;

pub const SECS_PER_MINUTE: u64 = 60;
