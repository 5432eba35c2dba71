use clap::{Parser, ValueEnum};
use mmcs_p3::{MixedMmcs, MmcsResult, Proof};
use p3_baby_bear::BabyBear;
use p3_blake3::Blake3;
use p3_keccak::Keccak256Hash;
use p3_matrix::dense::RowMajorMatrix;
use p3_symmetric::{CompressionFunctionFromHasher, CryptographicHasher};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::info;
use tracing_forest::{ForestLayer, util::LevelFilter};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

type F = BabyBear;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HashKind {
    Blake3,
    Keccak,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Row counts of the committed matrices, in batch order.
    #[arg(long, value_delimiter = ',', default_value = "1024,256,256,100")]
    heights: Vec<usize>,

    /// Row widths; the last one is reused for the remaining matrices.
    #[arg(long, value_delimiter = ',', default_value = "8,4,16,3")]
    widths: Vec<usize>,

    #[arg(long = "hash", value_enum, default_value = "blake3")]
    hash: HashKind,

    #[arg(short = 's', long, default_value = "1")]
    seed: u64,
}

fn main() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();

    let args = Args::parse();

    #[cfg(feature = "parallel")]
    info!(threads = rayon::current_num_threads(), "parallel commit");

    let result = match args.hash {
        HashKind::Blake3 => run(Blake3 {}, &args),
        HashKind::Keccak => run(Keccak256Hash {}, &args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run<H>(byte_hash: H, args: &Args) -> MmcsResult<()>
where
    H: CryptographicHasher<u8, [u8; 32]> + Copy + Sync,
{
    let mmcs = MixedMmcs::<_, _, 32>::new(
        byte_hash,
        CompressionFunctionFromHasher::<H, 2, 32>::new(byte_hash),
    );

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let batch: Vec<RowMajorMatrix<F>> = args
        .heights
        .iter()
        .enumerate()
        .map(|(i, &height)| {
            let width = args
                .widths
                .get(i)
                .or_else(|| args.widths.last())
                .copied()
                .unwrap_or(1);
            RowMajorMatrix::new((0..height * width).map(|_| rng.random()).collect(), width)
        })
        .collect();

    println!("=========================================");
    println!("Mixed matrix commitment");

    let (commitment, prover_data) = mmcs.commit(batch)?;
    println!("Root: {}", commitment.root);

    for info in commitment.matrices() {
        for row_index in [0, info.height - 1] {
            let (row, proof) = mmcs.open_batch(info.index, row_index, &prover_data)?;
            let bytes = proof.to_bytes();
            let decoded = Proof::<32>::from_bytes(&bytes)?;
            mmcs.verify_batch(&commitment, info.index, row_index, &row, &decoded)?;
            println!(
                "matrix {} ({}x{}) row {row_index}: {} steps, {} bytes, verified",
                info.index,
                info.height,
                info.width,
                proof.len(),
                bytes.len()
            );
        }
    }

    Ok(())
}
