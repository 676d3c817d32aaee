//! Command-line arguments of the `gamezone` driver.
//!
//! ```text
//! gamezone [--config <path>] [--admin <username> | --member <email>] [route]
//! ```

use gamezone_core::Credentials;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub credentials: Option<Credentials>,
    pub route: String,
}

impl CliArgs {
    pub fn from_env() -> AppResult<Self> {
        Self::parse(std::env::args().skip(1))
    }

    pub fn parse<I, S>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut credentials = None;
        let mut route = None;
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                // Read by ClientConfig::load.
                "--config" => {
                    args.next()
                        .ok_or_else(|| AppError::Usage("--config needs a path".into()))?;
                }
                "--admin" | "--member" => {
                    if credentials.is_some() {
                        return Err(AppError::Usage(
                            "give at most one of --admin and --member".into(),
                        ));
                    }
                    let value = args
                        .next()
                        .ok_or_else(|| AppError::Usage(format!("{} needs a value", arg)))?;
                    credentials = Some(if arg == "--admin" {
                        Credentials::admin(value)
                    } else {
                        Credentials::member(value)
                    });
                }
                flag if flag.starts_with("--") => {
                    return Err(AppError::Usage(format!("unknown flag {}", flag)));
                }
                _ => route = Some(arg),
            }
        }

        Ok(Self {
            credentials,
            route: route.unwrap_or_else(|| "/".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_home() {
        let args = CliArgs::parse(Vec::<String>::new()).unwrap();
        assert_eq!(args.route, "/");
        assert!(args.credentials.is_none());
    }

    #[test]
    fn test_login_flags_and_route() {
        let args = CliArgs::parse(["--config", "gz.toml", "--admin", "root", "/admin/games"]).unwrap();
        assert_eq!(args.credentials, Some(Credentials::admin("root")));
        assert_eq!(args.route, "/admin/games");

        let args = CliArgs::parse(["--member", "ana@zone.gg"]).unwrap();
        assert_eq!(args.credentials, Some(Credentials::member("ana@zone.gg")));
    }

    #[test]
    fn test_rejects_bad_usage() {
        assert!(CliArgs::parse(["--admin"]).is_err());
        assert!(CliArgs::parse(["--admin", "a", "--member", "b"]).is_err());
        assert!(CliArgs::parse(["--verbose"]).is_err());
    }
}
