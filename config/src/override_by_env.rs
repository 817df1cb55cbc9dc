use std::str::FromStr;

use utils::byte_nums::TsByteNumber;

pub trait OverrideByEnv {
    fn override_by_env(&mut self);
}

pub fn entry_override<T: FromStr>(value: &mut T, env_key: &str) -> bool {
    if let Ok(env_val) = std::env::var(env_key) {
        if let Ok(val) = env_val.parse::<T>() {
            *value = val;
            true
        } else {
            println!("failed to parse environment variable: {env_key}");
            false
        }
    } else {
        false
    }
}

/// Like [`entry_override`], but accepts byte units such as `"64KiB"`.
pub fn entry_override_bytes_num(value: &mut u64, env_key: &str) -> bool {
    if let Ok(env_val) = std::env::var(env_key) {
        if let Ok(val) = TsByteNumber::parse_bytes_num(&env_val) {
            *value = val;
            true
        } else {
            println!("failed to parse environment variable: {env_key}");
            false
        }
    } else {
        false
    }
}
