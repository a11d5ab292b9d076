use std::error::Error;
use std::fs;
use std::path::PathBuf;

use beam_check::{run_case, CheckReport, RegressionCase};
use clap::Args;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Regression case YAML with the expected particle count and statistics.
    #[arg(long)]
    pub case: PathBuf,
    /// Directory holding the beam shards.
    #[arg(long, default_value = "diags")]
    pub diags: PathBuf,
    /// Write the full report as JSON to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Formats like C `%e`: six decimals and a signed two-digit exponent.
fn sci(value: f64) -> String {
    let text = format!("{value:.6e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => text,
        },
        None => text,
    }
}

fn print_report(report: &CheckReport) {
    for (idx, stage) in report.stages.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        let [sigx, sigy, sigt, emittance_x, emittance_y, emittance_t] = stage.moments.statistics();
        println!("{}:", stage.name);
        println!("  sigx={} sigy={} sigt={}", sci(sigx), sci(sigy), sci(sigt));
        println!(
            "  emittance_x={} emittance_y={} emittance_t={}",
            sci(emittance_x),
            sci(emittance_y),
            sci(emittance_t)
        );
        println!(
            "  rtol={:?} (ignored: atol~={:?})",
            report.tolerance.rtol, report.tolerance.atol
        );
    }
}

pub fn run(args: &AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let case = RegressionCase::from_yaml_file(&args.case)?;
    let report = run_case(&case, &args.diags)?;
    print_report(&report);

    if let Some(path) = &args.report {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, report.to_json_pretty()?)?;
    }

    let failures: Vec<String> = report
        .failures()
        .map(|check| match &check.note {
            Some(note) => format!("{}: {note}", check.name),
            None => check.name.clone(),
        })
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        for failure in &failures {
            eprintln!("FAILED {failure}");
        }
        Err(format!("{} of {} check(s) failed", failures.len(), report.checks.len()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::sci;

    #[test]
    fn matches_printf_exponent_style() {
        assert_eq!(sci(1.0043885827109985e-3), "1.004389e-03");
        assert_eq!(sci(0.0), "0.000000e+00");
        assert_eq!(sci(12345.0), "1.234500e+04");
        assert_eq!(sci(-6.384184e-16), "-6.384184e-16");
    }
}
