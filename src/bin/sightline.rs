//! sightline: commit visibility checker.
//!
//! Resolves each revision against a local git repository and prints whether
//! a browser serving that repository would show it.

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use sightline::config::Config;
use sightline::{GitRepository, Identity, RequestAccess};

/// Check whether revisions are reachable from a repository's refs.
#[derive(Parser)]
#[command(name = "sightline")]
#[command(version = sightline::PKG_VERSION)]
#[command(about = "Per-user commit visibility checker")]
struct Args {
    /// Repository path (searched upwards).
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Check as this user instead of anonymously.
    #[arg(short, long, env = "SIGHTLINE_USER")]
    user: Option<String>,

    /// Walk in topological order (overrides the config file).
    #[arg(long)]
    topo: bool,

    /// Print the decision cache as JSON after checking.
    #[arg(long)]
    stats: bool,

    /// Revisions to check (branch names, tags, hex ids, `main~3`, ...).
    #[arg(required = true)]
    revs: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if args.topo {
        config.walk.topo_sort = true;
    }

    let repo = GitRepository::discover(&args.repo)?;
    let name = repository_name(&repo);
    debug!(repository = %name, "opened repository");

    let user = args.user.map(Identity::User).unwrap_or_default();
    let access = RequestAccess::new(user, name);
    let cache = config.build_cache();

    for rev in &args.revs {
        let id = repo.resolve(rev)?;
        let verdict = if cache.is_visible(&access, &repo, &id, &[])? {
            "visible"
        } else {
            "hidden"
        };
        println!("{id} {verdict}");
    }

    if args.stats {
        cache.run_pending_tasks();
        println!("{}", serde_json::to_string_pretty(&cache.inspect())?);
    }

    Ok(())
}

/// Name the repository after its work tree (or git dir for bare repositories).
fn repository_name(repo: &GitRepository) -> String {
    let inner = repo.inner();
    let dir = inner.workdir().unwrap_or_else(|| inner.path());
    dir.canonicalize()
        .unwrap_or_else(|_| dir.to_path_buf())
        .display()
        .to_string()
}
