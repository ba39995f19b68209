//! Codec configuration.
use std::{borrow::Cow, env::var, fmt};

use crate::{geometry::ByteOrder, interval::Precision};

/// Codec configuration.
///
/// Selects the byte order of produced wkb and the fractional second precision of intervals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodecConfig {
    pub byte_order: ByteOrder,
    pub precision: Precision,
}

impl CodecConfig {
    /// Retrieve configuration from environment variable.
    ///
    /// It reads:
    /// - `SQLEXT_BYTE_ORDER`, one of `big`, `little`, `xdr`, `ndr`, `be`, `le`
    /// - `SQLEXT_PRECISION`, one of `nano`, `micro`
    ///
    /// Missing or invalid value fallback to default.
    pub fn from_env() -> CodecConfig {
        macro_rules! env {
            ($name:literal,$def:expr) => {
                match var($name) {
                    Ok(ok) => match ok.parse() {
                        Ok(ok) => ok,
                        Err(_err) => {
                            #[cfg(feature = "log")]
                            log::warn!("{}: {_err:#}, using default", $name);
                            $def
                        },
                    },
                    Err(_) => $def,
                }
            };
        }

        let byte_order = env!("SQLEXT_BYTE_ORDER", ByteOrder::default());
        let precision = env!("SQLEXT_PRECISION", Precision::default());

        Self { byte_order, precision }
    }

    /// Parse config from `key=value` pairs separated by `;` or `&`.
    ///
    /// Keys are `byte_order` and `precision`, unspecified keys keep default value.
    pub fn parse(input: &str) -> Result<CodecConfig, ParseError> {
        let mut me = CodecConfig::default();

        for pair in input.split([';','&']) {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((key,value)) = pair.split_once('=') else {
                return Err(ParseError::new(format!("expected `key=value`, found {pair:?}")))
            };
            match key.trim() {
                "byte_order" => me.byte_order = value.trim().parse()?,
                "precision" => me.precision = value.trim().parse()?,
                key => return Err(ParseError::new(format!("unknown key {key:?}"))),
            }
        }

        Ok(me)
    }
}

impl std::str::FromStr for CodecConfig {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::str::FromStr for ByteOrder {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "big" | "xdr" | "be" => Ok(ByteOrder::BigEndian),
            "little" | "ndr" | "le" => Ok(ByteOrder::LittleEndian),
            _ => Err(ParseError::new(format!("unknown byte order {s:?}"))),
        }
    }
}

impl std::str::FromStr for Precision {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nano" => Ok(Precision::Nano),
            "micro" => Ok(Precision::Micro),
            _ => Err(ParseError::new(format!("unknown precision {s:?}"))),
        }
    }
}

/// Error when parsing configuration.
pub struct ParseError {
    pub(crate) reason: Cow<'static,str>,
}

impl ParseError {
    pub(crate) fn new(reason: impl Into<Cow<'static,str>>) -> ParseError {
        Self { reason: reason.into() }
    }
}

impl std::error::Error for ParseError { }

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f.write_str(&self.reason)
        }
        write!(f, "failed to parse config: {}", self.reason)
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_config() {
        let config = CodecConfig::parse("byte_order=big;precision=micro").unwrap();
        assert_eq!(config.byte_order, ByteOrder::BigEndian);
        assert_eq!(config.precision, Precision::Micro);

        let config: CodecConfig = "precision = micro".parse().unwrap();
        assert_eq!(config.byte_order, ByteOrder::LittleEndian);
        assert_eq!(config.precision, Precision::Micro);
    }

    #[test]
    fn empty_is_default() {
        assert_eq!(CodecConfig::parse("").unwrap(), CodecConfig::default());
    }

    #[cfg(feature = "log")]
    mod logger {
        use std::sync::Mutex;

        pub static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());

        struct Capture;

        impl log::Log for Capture {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                metadata.level() <= log::Level::Warn
            }

            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    WARNINGS.lock().unwrap().push(record.args().to_string());
                }
            }

            fn flush(&self) { }
        }

        pub fn init() {
            let _ = log::set_logger(&Capture);
            log::set_max_level(log::LevelFilter::Warn);
        }
    }

    fn set_env(byte_order: Option<&str>, precision: Option<&str>) {
        // only `env_fallback` touches these variables
        unsafe {
            match byte_order {
                Some(value) => std::env::set_var("SQLEXT_BYTE_ORDER", value),
                None => std::env::remove_var("SQLEXT_BYTE_ORDER"),
            }
            match precision {
                Some(value) => std::env::set_var("SQLEXT_PRECISION", value),
                None => std::env::remove_var("SQLEXT_PRECISION"),
            }
        }
    }

    #[test]
    fn env_fallback() {
        #[cfg(feature = "log")]
        logger::init();

        set_env(None, None);
        assert_eq!(CodecConfig::from_env(), CodecConfig::default());

        set_env(Some("xdr"), Some("MICRO"));
        let config = CodecConfig::from_env();
        assert_eq!(config.byte_order, ByteOrder::BigEndian);
        assert_eq!(config.precision, Precision::Micro);

        set_env(Some("middle"), Some("micro"));
        let config = CodecConfig::from_env();
        assert_eq!(config.byte_order, ByteOrder::LittleEndian);
        assert_eq!(config.precision, Precision::Micro);

        set_env(Some("be"), Some("pico"));
        let config = CodecConfig::from_env();
        assert_eq!(config.byte_order, ByteOrder::BigEndian);
        assert_eq!(config.precision, Precision::Nano);

        set_env(None, None);

        #[cfg(feature = "log")]
        {
            let warnings = logger::WARNINGS.lock().unwrap();
            assert!(warnings.iter().any(|w| w.starts_with("SQLEXT_BYTE_ORDER") && w.contains("middle")));
            assert!(warnings.iter().any(|w| w.starts_with("SQLEXT_PRECISION") && w.contains("pico")));
        }
    }

    #[test]
    fn reject_unknown() {
        assert!(CodecConfig::parse("endian=big").is_err());
        assert!(CodecConfig::parse("byte_order=middle").is_err());
        assert!(CodecConfig::parse("byte_order").is_err());
        assert!("XDR".parse::<ByteOrder>().is_ok());
    }
}
