//! This is the command line tool that runs the CTW model over an input file
//! and reports how well it predicts it.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use ctw::ctw::{kt_signed, weighted};
use ctw::utils::bits::{bytes_to_bits, format_bits, parse_bits};
use ctw::{ContextTree, Predictor, Result};

use std::fs;
use std::time::Instant;

/// A scoped utility struct for measuring and reporting time.
struct Timer {
    start: std::time::Instant,
}

impl Timer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let now = Instant::now();
        if let Some(duration) = now.checked_duration_since(self.start) {
            log::info!(
                "Operation completed in {:03} seconds",
                duration.as_secs_f32()
            );
        }
    }
}

/// Load the input file as bits. Text files hold '0' and '1' characters,
/// anything else is modeled bit by bit, MSB first.
fn load_bits(path: &str, is_text: bool) -> Result<Vec<u8>> {
    let input = fs::read(path).expect("Can't open the input file");
    if is_text {
        return parse_bits(&String::from_utf8_lossy(&input));
    }
    Ok(bytes_to_bits(&input))
}

fn run_predict(matches: &ArgMatches) -> Result<()> {
    let depth = *matches.get_one::<usize>("depth").unwrap();
    let is_text = matches.get_flag("text");
    let path = matches.get_one::<String>("INPUT").unwrap();

    // Without an explicit seed, start from a context of zeros so that every
    // bit of the input is predicted.
    let seed = match matches.get_one::<String>("seed") {
        Some(seed) => parse_bits(seed)?,
        None => vec![0; depth],
    };
    let input = load_bits(path, is_text)?;
    log::info!("Modeling {} bits with depth {}", input.len(), depth);

    let _timer = Timer::new();
    let mut predictor = Predictor::new(&seed, depth)?;
    let mut total = 0.0;
    for (i, &bit) in input.iter().enumerate() {
        let p = predictor.predict(bit)?;
        total -= p.log2();
        log::debug!(
            "#{} bit={} p={:.6} context={}",
            i,
            bit,
            p,
            format_bits(predictor.context())
        );
        predictor = predictor.advance(bit)?;
    }

    let bits = input.len().max(1) as f64;
    log::info!("Sequential code length: {:.3} bits", total);
    log::info!("Weighted code length: {:.3} bits", predictor.code_length());
    log::info!("Bits per symbol: {:.4}", total / bits);
    println!("{:.3}", total);
    Ok(())
}

fn run_kt(matches: &ArgMatches) -> Result<()> {
    let zeros = *matches.get_one::<i64>("ZEROS").unwrap();
    let ones = *matches.get_one::<i64>("ONES").unwrap();
    let p = kt_signed(zeros, ones)?;
    log::info!("kt({}, {}) = 2^{:.4}", zeros, ones, p.log2());
    println!("{}", p);
    Ok(())
}

fn run_tree(matches: &ArgMatches) -> Result<()> {
    let depth = *matches.get_one::<usize>("depth").unwrap();
    let path = matches.get_one::<String>("INPUT").unwrap();
    let input = load_bits(path, true)?;

    let tree = ContextTree::compile(&input, depth)?;
    log::info!("Counted {} observations", tree.total());
    for (context, [zeros, ones]) in tree.leaves() {
        println!("{} 0:{} 1:{}", format_bits(&context), zeros, ones);
    }
    println!("p_w = {}", weighted::tree_probability(&tree));
    println!("code length = {:.3} bits", weighted::code_length(&tree));
    Ok(())
}

fn depth_arg() -> Arg {
    Arg::new("depth")
        .short('D')
        .long("depth")
        .value_name("N")
        .help("The maximum context depth")
        .value_parser(value_parser!(usize))
        .default_value("8")
        .num_args(1)
}

fn input_arg() -> Arg {
    Arg::new("INPUT")
        .help("Sets the input file to use")
        .required(true)
        .index(1)
}

fn main() {
    let matches = Command::new("CLI")
        .version("1.x")
        .subcommand_required(true)
        .subcommand(
            Command::new("predict")
                .about("Predict the bits of the input and report the cost")
                .arg(depth_arg())
                .arg(
                    Arg::new("text")
                        .long("text")
                        .help("The input is a text file of '0' and '1'")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("BITS")
                        .help("The initial context, at least depth bits long")
                        .num_args(1),
                )
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("kt")
                .about("Print the Krichevsky–Trofimov estimate")
                .arg(
                    Arg::new("ZEROS")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("ONES")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("tree")
                .about("Count a text file of bits and print the leaves")
                .arg(depth_arg())
                .arg(input_arg()),
        )
        .get_matches();

    env_logger::builder().format_timestamp(None).init();

    let status = match matches.subcommand() {
        Some(("predict", sub)) => run_predict(sub),
        Some(("kt", sub)) => run_kt(sub),
        Some(("tree", sub)) => run_tree(sub),
        _ => unreachable!("a subcommand is required"),
    };

    if let Err(err) = status {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
