//! Available subcommands.

use clap::Subcommand;

/// Operations on the stored speed map and the enforcement pipeline.
///
/// `<url>` arguments accept a full URL or a bare host name.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the stored speed for a site
    Get {
        /// Page URL or host
        url: String,
    },

    /// Store a speed for a site, as the popup would
    Set {
        /// Page URL or host
        url: String,
        /// Playback speed (clamped to 0.1..=16)
        speed: f64,
    },

    /// List every stored site speed
    List,

    /// Remove a site's stored speed
    Forget {
        /// Page URL or host
        url: String,
    },

    /// Show whether the controller would be injected into a URL
    Gate {
        /// Full page URL
        url: String,
    },

    /// Drive a virtual page through attach, insertion, keyboard steps and
    /// a debounced save against the configured store
    Demo {
        /// Host of the virtual page
        #[arg(long, default_value = "video.example")]
        host: String,
        /// Number of Meta+Alt+= presses
        #[arg(long, default_value_t = 10)]
        steps: u32,
    },
}
