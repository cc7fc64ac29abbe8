//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Resolve CLI input into domain types
//! - Call core services
//! - Format output for the terminal

pub mod demo;
pub mod forget;
pub mod gate;
pub mod get;
pub mod list;
pub mod set;

use vidpace_core::DomainKey;

use crate::error::CliError;

/// A site named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub domain: DomainKey,
    /// A page URL for the site (synthesised for bare host names).
    pub url: String,
}

/// Resolve a full URL or a bare host name.
pub fn resolve_target(input: &str) -> Result<Target, CliError> {
    let input = input.trim();
    if let Some(domain) = DomainKey::from_url(input) {
        return Ok(Target {
            domain,
            url: input.to_string(),
        });
    }
    if input.contains(['/', ' ']) {
        return Err(CliError::Arguments(format!("No host in '{input}'")));
    }
    let domain = DomainKey::from_host(input)
        .ok_or_else(|| CliError::Arguments(format!("No host in '{input}'")))?;
    Ok(Target {
        url: format!("https://{domain}/"),
        domain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_full_url() {
        let target = resolve_target("https://www.Video.example/watch?v=1").unwrap();
        assert_eq!(target.domain.as_str(), "video.example");
        assert_eq!(target.url, "https://www.Video.example/watch?v=1");
    }

    #[test]
    fn test_resolve_bare_host() {
        let target = resolve_target("www.video.example").unwrap();
        assert_eq!(target.domain.as_str(), "video.example");
        assert_eq!(target.url, "https://video.example/");
    }

    #[test]
    fn test_resolve_rejects_hostless_input() {
        assert!(resolve_target("data:text/html,hi").is_err());
        assert!(resolve_target("   ").is_err());
        assert!(resolve_target("not a host").is_err());
    }
}
