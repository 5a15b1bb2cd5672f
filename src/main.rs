use std::env;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use conventional_release::config::ConfigStore;
use conventional_release::conventional::Preset;
use conventional_release::error::ReleaserError;
use conventional_release::git::Git2Repository;
use conventional_release::prompt::ConsolePrompter;
use conventional_release::releaser::{ReleaseOptions, Releaser};
use conventional_release::ui;
use conventional_release::version::BumpType;

#[derive(clap::Parser)]
#[command(
    name = "ccr",
    about = "Create conventional-commit releases: version bump, changelog, tag",
    version
)]
struct Args {
    #[arg(
        short,
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Derive the release type from the commit history"
    )]
    auto: bool,

    #[arg(
        short,
        long,
        help = "Release type (major, minor, patch, premajor, preminor, prepatch, prerelease); required when --auto=false"
    )]
    release: Option<BumpType>,

    #[arg(short, long, help = "Pre-release identifier, e.g. alpha")]
    identifier: Option<String>,

    #[arg(short, long, help = "Bump even when no commit was made since the last tag")]
    forced: bool,

    #[arg(
        short,
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Prefix tags with 'v'"
    )]
    prefix: bool,

    #[arg(
        short = 'm',
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Create the tag and the changelog commit"
    )]
    commit: bool,

    #[arg(
        short,
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Write the new version into the manifest file"
    )]
    update: bool,

    #[arg(short = 'l', long, help = "Regenerate the changelog before tagging")]
    changelog: bool,

    #[arg(
        long,
        default_value = "angular",
        help = "Changelog preset (angular, conventionalcommits)"
    )]
    preset: Preset,

    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Keep existing changelog content below the new section"
    )]
    append: bool,

    #[arg(long, help = "Re-run the manifest file search")]
    find: bool,

    #[arg(long, help = "Clear the persisted configuration before running")]
    reset: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,
}

fn run(args: Args) -> conventional_release::Result<()> {
    let workdir = env::current_dir()?;
    let repo = Git2Repository::discover(&workdir)?;
    let store = match args.config {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::new()?,
    };
    let mut prompt = ConsolePrompter::new();

    let opts = ReleaseOptions {
        auto: args.auto,
        release: args.release,
        identifier: args.identifier,
        forced: args.forced,
        prefix: args.prefix,
        commit: args.commit,
        update: args.update,
        changelog: args.changelog,
        preset: args.preset,
        append: args.append,
        find: args.find,
        reset: args.reset,
    };

    let outcome = Releaser::new(opts, store, &repo, &mut prompt, workdir)?.run()?;

    if outcome.committed {
        ui::display_success(&format!("Bump to {} completed.", outcome.label));
    } else {
        ui::display_success(&format!(
            "Bump to {} completed, no commits made.",
            outcome.label
        ));
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => {}
        // declining a prompt is a clean exit, not a failure
        Err(ReleaserError::UserAborted) => {
            ui::display_status("Aborting.");
        }
        Err(err @ ReleaserError::NoNewCommit) => {
            ui::display_warning(&err.to_string());
        }
        Err(err) => {
            ui::display_error(&err.to_string());
            process::exit(1);
        }
    }
}
