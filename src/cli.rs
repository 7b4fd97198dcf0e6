use crate::config::ConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    width: Option<u32>,
    height: Option<u32>,
    particles: Option<u32>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Use --width/--height/--particles with values.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "width" => {
                    overrides.width =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid width '{value}'"))?);
                }
                "height" => {
                    overrides.height =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid height '{value}'"))?);
                }
                "particles" => {
                    overrides.particles = Some(
                        value.parse::<u32>().with_context(|| format!("Invalid particle count '{value}'"))?,
                    );
                }
                other => bail!("Unknown flag '--{other}'"),
            }
        }
        Ok(overrides)
    }

    pub fn into_config_overrides(self) -> ConfigOverrides {
        ConfigOverrides { width: self.width, height: self.height, particle_count: self.particles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_flags() {
        let overrides =
            CliOverrides::parse(["prog", "--width", "800", "--height", "600", "--particles", "64"])
                .expect("parse");
        let cfg = overrides.into_config_overrides();
        assert_eq!(cfg.width, Some(800));
        assert_eq!(cfg.height, Some(600));
        assert_eq!(cfg.particle_count, Some(64));
    }

    #[test]
    fn rejects_unknown_flags_and_missing_values() {
        assert!(CliOverrides::parse(["prog", "--vsync", "on"]).is_err());
        assert!(CliOverrides::parse(["prog", "--width"]).is_err());
        assert!(CliOverrides::parse(["prog", "width"]).is_err());
    }

    #[test]
    fn empty_args_yield_empty_overrides() {
        let overrides = CliOverrides::parse(["prog"]).expect("parse");
        assert!(overrides.into_config_overrides().is_empty());
    }
}
