// Property-based tests for command-line parsing
// Numeric tuning flags round-trip into config overrides unchanged.

use clap::Parser;
use codenote_cli::router::{build_overrides, Cli, Commands};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_numeric_flags_reach_overrides(
        jobs in 1usize..64,
        size in 1usize..100_000,
        retries in 0u32..10,
    ) {
        let jobs_arg = jobs.to_string();
        let size_arg = size.to_string();
        let retries_arg = retries.to_string();
        let cli = Cli::try_parse_from([
            "codenote",
            "annotate",
            "src",
            "--jobs",
            jobs_arg.as_str(),
            "--max-chunk-size",
            size_arg.as_str(),
            "--retries",
            retries_arg.as_str(),
        ])
        .unwrap();

        let Commands::Annotate { service, run, .. } = cli.command else {
            panic!("expected annotate");
        };
        let overrides = build_overrides(&service, &run);

        prop_assert_eq!(overrides.jobs, Some(jobs));
        prop_assert_eq!(overrides.max_chunk_size, Some(size));
        prop_assert_eq!(overrides.chunk_retries, Some(retries));
    }

    #[test]
    fn prop_extension_lists_preserved(exts in prop::collection::vec("[a-z]{1,4}", 1..6)) {
        let joined = exts.join(",");
        let cli = Cli::try_parse_from(["codenote", "annotate", "src", "-e", joined.as_str()]).unwrap();

        let Commands::Annotate { run, .. } = cli.command else {
            panic!("expected annotate");
        };
        prop_assert_eq!(run.extensions, exts);
    }
}
