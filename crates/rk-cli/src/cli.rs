use clap::{value_parser, Arg, ArgAction, Command};

fn kernel_run_args(cmd: Command, default_size: &'static str) -> Command {
    cmd.arg(
        Arg::new("size")
            .short('n')
            .long("size")
            .help("Extent N of the square operands")
            .value_parser(value_parser!(usize))
            .default_value(default_size),
    )
    .arg(
        Arg::new("fill")
            .long("fill")
            .help("Operand initialisation: zeros, ones, pattern or random")
            .value_parser(["zeros", "ones", "pattern", "random"])
            .default_value("ones"),
    )
    .arg(
        Arg::new("dtype")
            .long("dtype")
            .help(
                "Precision the operands are supplied in. float16 inputs are rounded \
                 through half precision; accumulation is always float32.",
            )
            .default_value("f32"),
    )
    .arg(
        Arg::new("seed")
            .long("seed")
            .help("Seed for --fill random")
            .value_parser(value_parser!(u64))
            .default_value("0"),
    )
    .arg(
        Arg::new("warmup")
            .long("warmup")
            .help("Untimed runs before measuring")
            .value_parser(value_parser!(usize))
            .default_value("3"),
    )
    .arg(
        Arg::new("reps")
            .long("reps")
            .help("Timed runs; the median is reported")
            .value_parser(value_parser!(usize))
            .default_value("9"),
    )
    .arg(
        Arg::new("json")
            .long("json")
            .help("Print the run record as JSON instead of text")
            .action(ArgAction::SetTrue),
    )
}

/// The `rk` command-line definition.
pub fn build_cli() -> Command {
    Command::new("rk")
        .version(clap::crate_version!())
        .about("Reference matmul and valid-mode conv2d kernels: run, time and check them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Raise log verbosity (-v debug, -vv trace). RK_LOG overrides.")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(kernel_run_args(
            Command::new("matmul").about("Multiply two N x N matrices"),
            "32",
        ))
        .subcommand(
            kernel_run_args(
                Command::new("conv2d")
                    .about("Valid-mode cross-correlation of an N x N input with a K x K kernel"),
                "1024",
            )
            .arg(
                Arg::new("kernel")
                    .short('k')
                    .long("kernel")
                    .help("Extent K of the square kernel (K <= N)")
                    .value_parser(value_parser!(usize))
                    .default_value("1024"),
            ),
        )
        .subcommand(
            Command::new("check")
                .about("Run the conformance suite against the CPU reference backend")
                .arg(
                    Arg::new("tolerance")
                        .long("tolerance")
                        .help("exact (bitwise) or relaxed (relative error)")
                        .value_parser(["exact", "relaxed"])
                        .default_value("exact"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the random operands")
                        .value_parser(value_parser!(u64)),
                ),
        )
}
