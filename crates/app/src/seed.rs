//! Launch-option resolution from command-line arguments.

use core::rng::entropy_seed;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaunchOptions {
    pub seed: Option<u64>,
    pub target_rooms: Option<usize>,
    pub room_size: Option<u32>,
}

impl LaunchOptions {
    /// The seed generation will actually run with.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(entropy_seed)
    }
}

/// Parses `--seed`, `--rooms`, and `--room-size`, each accepting either
/// `--flag value` or `--flag=value`. Unknown arguments are ignored so the
/// engine's own flags pass through.
pub fn parse_args(args: &[String]) -> Result<LaunchOptions, String> {
    let mut options = LaunchOptions { seed: None, target_rooms: None, room_size: None };
    let mut index = 1;

    while index < args.len() {
        let argument = args[index].as_str();
        let mut consumed = 1;

        if let Some(value) = flag_value("--seed", argument, args.get(index + 1), &mut consumed)? {
            set_once(&mut options.seed, parse_number("--seed", &value)?, "--seed")?;
        } else if let Some(value) =
            flag_value("--rooms", argument, args.get(index + 1), &mut consumed)?
        {
            set_once(&mut options.target_rooms, parse_number("--rooms", &value)?, "--rooms")?;
        } else if let Some(value) =
            flag_value("--room-size", argument, args.get(index + 1), &mut consumed)?
        {
            set_once(&mut options.room_size, parse_number("--room-size", &value)?, "--room-size")?;
        }

        index += consumed;
    }

    Ok(options)
}

/// Matches one flag in either spelling and reports how many arguments it ate.
fn flag_value(
    flag: &str,
    argument: &str,
    next: Option<&String>,
    consumed: &mut usize,
) -> Result<Option<String>, String> {
    if argument == flag {
        let Some(value) = next else {
            return Err(format!("missing value for {flag}"));
        };
        *consumed = 2;
        return Ok(Some(value.clone()));
    }
    if let Some(value) = argument.strip_prefix(flag)
        && let Some(value) = value.strip_prefix('=')
    {
        return Ok(Some(value.to_string()));
    }
    Ok(None)
}

fn parse_number<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, String> {
    raw.parse::<T>().map_err(|_| format!("value '{raw}' for {flag} must be a number"))
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    *slot = Some(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn no_flags_leaves_every_option_unset() {
        let options = parse_args(&as_args(&["game"])).expect("empty args parse");
        assert_eq!(options, LaunchOptions { seed: None, target_rooms: None, room_size: None });
    }

    #[test]
    fn flags_parse_in_both_spellings() {
        let options = parse_args(&as_args(&["game", "--seed", "42", "--rooms=10"]))
            .expect("valid flags parse");
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.target_rooms, Some(10));
        assert_eq!(options.room_size, None);
    }

    #[test]
    fn room_size_flag_is_recognized() {
        let options =
            parse_args(&as_args(&["game", "--room-size", "10"])).expect("valid flag parses");
        assert_eq!(options.room_size, Some(10));
    }

    #[test]
    fn missing_values_are_rejected() {
        let err = parse_args(&as_args(&["game", "--seed"])).expect_err("dangling flag");
        assert!(err.contains("missing"), "error should explain the missing value: {err}");
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let err = parse_args(&as_args(&["game", "--rooms=lots"])).expect_err("non-numeric value");
        assert!(err.contains("number"), "error should explain the numeric requirement: {err}");
    }

    #[test]
    fn duplicate_flags_are_rejected() {
        let err = parse_args(&as_args(&["game", "--seed=1", "--seed", "2"]))
            .expect_err("duplicate flag");
        assert!(err.contains("more than once"), "error should explain the duplicate: {err}");
    }

    #[test]
    fn unknown_arguments_pass_through() {
        let options = parse_args(&as_args(&["game", "--fullscreen", "--seed=7"]))
            .expect("unknown flags are ignored");
        assert_eq!(options.seed, Some(7));
    }

    #[test]
    fn explicit_seeds_resolve_to_themselves() {
        let options = LaunchOptions { seed: Some(2_026), target_rooms: None, room_size: None };
        assert_eq!(options.resolve_seed(), 2_026);
    }
}
