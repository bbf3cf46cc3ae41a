use crate::{
    services::request_builder::DEFAULT_REGION, steps::DEFAULT_OBJECT_SIZE, suite::RunMode,
};
use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use std::{
    env::{self, VarError},
    str::FromStr,
    time::Duration,
};

/// Objects uploaded by the enumerated loop unless configured otherwise.
pub const DEFAULT_OBJECT_COUNT: usize = 101;

/// Centralized run configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: Url,
    pub region: String,
    pub object_count: usize,
    pub object_size: usize,
    pub timeout: Option<Duration>,
    pub cleanup: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "S3 API compatibility verifier")]
pub struct Args {
    /// Endpoint of the server under test (overrides S3_VERIFY_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Region used for bucket creation (overrides S3_VERIFY_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Objects uploaded by the PutObject loop (overrides S3_VERIFY_OBJECT_COUNT)
    #[arg(long)]
    pub object_count: Option<usize>,

    /// Size in bytes of each generated object (overrides S3_VERIFY_OBJECT_SIZE)
    #[arg(long)]
    pub object_size: Option<usize>,

    /// Per-request deadline in seconds (overrides S3_VERIFY_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Create and populate a bucket for later prepared runs, then exit
    #[arg(long, conflicts_with = "prepared_bucket")]
    pub prepare: bool,

    /// Run against a bucket populated by an earlier --prepare run
    #[arg(long)]
    pub prepared_bucket: Option<String>,

    /// Leave created objects and buckets in place
    #[arg(long)]
    pub no_cleanup: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and run mode.
    pub fn from_env_and_args() -> Result<(Self, RunMode)> {
        Self::merge(Args::parse(), |name| env::var(name))
    }

    /// Merge parsed args over values looked up through `lookup`.
    pub fn merge(
        args: Args,
        lookup: impl Fn(&str) -> Result<String, VarError>,
    ) -> Result<(Self, RunMode)> {
        // --- Environment fallback ---
        let env_endpoint = read_var(&lookup, "S3_VERIFY_ENDPOINT")?
            .unwrap_or_else(|| "http://127.0.0.1:9000".into());
        let env_region =
            read_var(&lookup, "S3_VERIFY_REGION")?.unwrap_or_else(|| DEFAULT_REGION.into());
        let env_count = parse_var(&lookup, "S3_VERIFY_OBJECT_COUNT")?;
        let env_size = parse_var(&lookup, "S3_VERIFY_OBJECT_SIZE")?;
        let env_timeout = parse_var(&lookup, "S3_VERIFY_TIMEOUT_SECS")?;

        // --- Merge ---
        let endpoint = args.endpoint.unwrap_or(env_endpoint);
        let endpoint =
            Url::parse(&endpoint).with_context(|| format!("parsing endpoint `{}`", endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("endpoint `{}` must use http or https", endpoint);
        }

        let object_count = args
            .object_count
            .or(env_count)
            .unwrap_or(DEFAULT_OBJECT_COUNT);
        if object_count == 0 {
            anyhow::bail!("object count must be at least 1");
        }

        let cfg = Self {
            endpoint,
            region: args.region.unwrap_or(env_region),
            object_count,
            object_size: args
                .object_size
                .or(env_size)
                .unwrap_or(DEFAULT_OBJECT_SIZE),
            timeout: args
                .timeout_secs
                .or(env_timeout)
                .map(Duration::from_secs),
            cleanup: !args.no_cleanup,
        };

        let mode = match (args.prepare, args.prepared_bucket) {
            (true, _) => RunMode::Prepare,
            (false, Some(bucket)) if bucket.is_empty() => {
                anyhow::bail!("--prepared-bucket must not be empty")
            }
            (false, Some(bucket)) => RunMode::Prepared { bucket },
            (false, None) => RunMode::Unprepared,
        };

        Ok((cfg, mode))
    }
}

fn read_var(
    lookup: &impl Fn(&str) -> Result<String, VarError>,
    name: &str,
) -> Result<Option<String>> {
    match lookup(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Result<String, VarError>,
    name: &str,
) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match read_var(lookup, name)? {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashMap, ffi::OsString};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, VarError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn defaults_without_env_or_args() {
        let (cfg, mode) = AppConfig::merge(Args::default(), lookup(&[])).unwrap();
        assert_eq!(cfg.endpoint.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.object_count, DEFAULT_OBJECT_COUNT);
        assert_eq!(cfg.object_size, 60);
        assert_eq!(cfg.timeout, None);
        assert!(cfg.cleanup);
        assert_eq!(mode, RunMode::Unprepared);
    }

    #[test]
    fn args_override_env() {
        let args = Args {
            object_count: Some(1001),
            endpoint: Some("https://s3.example.com".into()),
            prepared_bucket: Some("kept".into()),
            no_cleanup: true,
            ..Args::default()
        };
        let env = lookup(&[
            ("S3_VERIFY_OBJECT_COUNT", "5"),
            ("S3_VERIFY_ENDPOINT", "http://ignored:1"),
            ("S3_VERIFY_TIMEOUT_SECS", "30"),
        ]);
        let (cfg, mode) = AppConfig::merge(args, env).unwrap();
        assert_eq!(cfg.object_count, 1001);
        assert_eq!(cfg.endpoint.host_str(), Some("s3.example.com"));
        assert_eq!(cfg.timeout, Some(Duration::from_secs(30)));
        assert!(!cfg.cleanup);
        assert_eq!(
            mode,
            RunMode::Prepared {
                bucket: "kept".into()
            }
        );
    }

    #[test]
    fn malformed_env_is_rejected_with_context() {
        let err = AppConfig::merge(
            Args::default(),
            lookup(&[("S3_VERIFY_OBJECT_COUNT", "lots")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("S3_VERIFY_OBJECT_COUNT"));
    }

    #[test]
    fn non_unicode_env_is_an_error_not_a_default() {
        let lookup = |name: &str| -> Result<String, VarError> {
            match name {
                "S3_VERIFY_REGION" => Err(VarError::NotUnicode(OsString::from("eu-west-1"))),
                _ => Err(VarError::NotPresent),
            }
        };
        let err = AppConfig::merge(Args::default(), lookup).unwrap_err();
        assert!(err.to_string().contains("S3_VERIFY_REGION"));
    }

    #[test]
    fn zero_object_count_is_rejected() {
        let args = Args {
            object_count: Some(0),
            ..Args::default()
        };
        assert!(AppConfig::merge(args, lookup(&[])).is_err());

        let env = lookup(&[("S3_VERIFY_OBJECT_COUNT", "0")]);
        let err = AppConfig::merge(Args::default(), env).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let args = Args {
            endpoint: Some("ftp://files.example.com".into()),
            ..Args::default()
        };
        assert!(AppConfig::merge(args, lookup(&[])).is_err());
    }

    #[test]
    fn prepare_flag_selects_prepare_mode() {
        let args = Args {
            prepare: true,
            ..Args::default()
        };
        let (_, mode) = AppConfig::merge(args, lookup(&[])).unwrap();
        assert_eq!(mode, RunMode::Prepare);
    }
}
