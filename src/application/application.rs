use std::time::Instant;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::config::{Limits, LimitsError};
use crate::filesystem::{
    self, Answers, BuildError, DirectorySizes, FilesystemNode, QueryError, SizeOverflowError,
    TreeBuilder,
};
use crate::transcript::{TranscriptReadError, read_transcript};

pub struct Application;

/// Everything a run produced: the resolved tree and both answers.
#[derive(Debug)]
pub struct Solution {
    pub tree: FilesystemNode,
    pub answers: Answers,
}

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let solution = Self::solve(&app_config).await?;

        if app_config.print_tree {
            let colorize = filesystem::stdout_supports_color();
            print!("{}", filesystem::render_tree(&solution.tree, colorize));
        }
        println!("{}", solution.answers);

        Ok(())
    }

    pub async fn solve(app_config: &RuntimeConfig) -> Result<Solution, ApplicationError> {
        let limits = Limits::read(&app_config.root)
            .await
            .context(LimitsSnafu)?
            .with_overrides(app_config.overrides);
        debug!("Using limits: {:?}", limits);

        let start_step = Instant::now();
        let contents = read_transcript(&app_config.input_path())
            .await
            .context(TranscriptSnafu)?;
        info!("Time to read the transcript: {:?}", start_step.elapsed());

        let start_step = Instant::now();
        let mut tree = TreeBuilder::build(contents.lines()).context(BuildSnafu)?;
        info!("Time to rebuild the filesystem: {:?}", start_step.elapsed());

        let start_step = Instant::now();
        let used = tree.resolve_sizes().context(ResolveSnafu)?;
        info!(
            "Time to resolve directory sizes: {:?} ({} in use)",
            start_step.elapsed(),
            used
        );

        let start_step = Instant::now();
        let answers = Self::answer(&tree, &limits).context(QuerySnafu)?;
        info!("Time to answer both parts: {:?}", start_step.elapsed());

        Ok(Solution { tree, answers })
    }

    fn answer(tree: &FilesystemNode, limits: &Limits) -> Result<Answers, QueryError> {
        let sizes = DirectorySizes::collect(tree)?;
        debug!("Collected {} directories", sizes.iter().count());

        let part1 = sizes.sum_at_most(limits.small_directory_threshold)?;

        let needed = sizes.space_to_free(limits.disk_capacity, limits.required_free_space);
        let chosen = sizes.smallest_to_free(limits.disk_capacity, limits.required_free_space)?;
        info!("Need to free {}, deleting {} suffices", needed, chosen);

        Ok(Answers {
            part1,
            part2: chosen.size,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the limits"))]
    LimitsError { source: LimitsError },
    #[snafu(display("Critical failure encountered while reading the transcript"))]
    TranscriptError { source: TranscriptReadError },
    #[snafu(display("Critical failure encountered while rebuilding the filesystem"))]
    BuildError { source: BuildError },
    #[snafu(display("Critical failure encountered while resolving directory sizes"))]
    ResolveError { source: SizeOverflowError },
    #[snafu(display("Critical failure encountered while answering the queries"))]
    QueryError { source: QueryError },
}
