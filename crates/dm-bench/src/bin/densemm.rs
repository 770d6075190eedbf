use anyhow::Context;
use clap::Parser;
use dm_bench::{init_logging, BenchConfig, Benchmark, Fill};
use dm_parallel::{default_threads, MultiplyConfig, RemainderPolicy, StrategyKind};
use dm_tensor::KernelKind;

/// Dense matrix multiplication benchmark
#[derive(Parser, Debug)]
#[command(name = "densemm", version, about = "Time parallel dense f32 matrix multiplication")]
struct Cli {
    /// Matrix side length
    #[arg(short = 'n', long, env = "DENSEMM_SIZE", default_value_t = dm_bench::config::DEFAULT_SIZE)]
    size: usize,

    /// Worker threads (defaults to hardware concurrency)
    #[arg(short, long, env = "DENSEMM_THREADS")]
    threads: Option<usize>,

    /// Parallel strategy: explicit | pool
    #[arg(short, long, env = "DENSEMM_STRATEGY", default_value = "explicit")]
    strategy: StrategyKind,

    /// Row kernel: scalar | simd | auto
    #[arg(short, long, env = "DENSEMM_KERNEL", default_value = "scalar")]
    kernel: KernelKind,

    /// Leftover rows under explicit threading: last-worker | reject
    #[arg(long, env = "DENSEMM_REMAINDER", default_value = "last-worker")]
    remainder: RemainderPolicy,

    /// Input pattern: indexed | identity | random
    #[arg(long, env = "DENSEMM_FILL", default_value = "indexed")]
    fill: Fill,

    /// Seed for the random fill
    #[arg(long, env = "DENSEMM_SEED", default_value_t = 42)]
    seed: u64,

    /// Untimed runs before the measured one
    #[arg(long, env = "DENSEMM_WARMUP", default_value_t = 0)]
    warmup: usize,

    /// Check the result against the serial scalar reference
    #[arg(long, env = "DENSEMM_VERIFY")]
    verify: bool,

    /// Run every strategy and report each
    #[arg(long)]
    compare: bool,
}

impl Cli {
    fn to_config(&self) -> BenchConfig {
        let multiply = MultiplyConfig::default()
            .with_threads(self.threads.unwrap_or_else(default_threads))
            .with_strategy(self.strategy)
            .with_kernel(self.kernel)
            .with_remainder(self.remainder);
        BenchConfig::default()
            .with_size(self.size)
            .with_multiply(multiply)
            .with_fill(self.fill.with_seed(self.seed))
            .with_warmup(self.warmup)
            .with_verify(self.verify)
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = cli.to_config();

    println!("Using {} threads.", config.multiply.threads);

    let strategies = if cli.compare {
        StrategyKind::ALL.to_vec()
    } else {
        vec![config.multiply.strategy]
    };

    for strategy in strategies {
        let bench = Benchmark::new(config.clone().with_strategy(strategy))
            .with_context(|| format!("failed to set up {} benchmark", strategy))?;
        let report = bench
            .run()
            .with_context(|| format!("{} benchmark failed", strategy))?;
        println!("{report}");
    }
    Ok(())
}
