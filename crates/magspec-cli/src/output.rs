//! Result output formatting and writing.

use crate::orchestrator::AnalysisResult;
use crate::OutputFormat;
use anyhow::Result;
use lib_dsp::BandStatsMap;
use num_complex::Complex64;
use std::io::Write;
use std::path::Path;

/// Write an analysis result to `path`, or to stdout when `path` is `None`.
pub fn write_result(result: &AnalysisResult, path: Option<&Path>, format: OutputFormat) -> Result<()> {
    match path {
        Some(path) => {
            let mut f = std::io::BufWriter::new(std::fs::File::create(path)?);
            format_result(result, format, &mut f)?;
            f.flush()?;
            tracing::info!("Wrote results to {:?}", path);
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            format_result(result, format, &mut lock)?;
        }
    }
    Ok(())
}

/// Format an analysis result into `out`.
pub fn format_result<W: Write>(result: &AnalysisResult, format: OutputFormat, out: &mut W) -> Result<()> {
    match result {
        AnalysisResult::Spectrum(spec) => {
            write_complex(out, format, "Spectrum", &spec.frequencies, &spec.values)?;
        }
        AnalysisResult::Psd(psd) => {
            write_complex(out, format, "Power Spectral Density", &psd.frequencies, &psd.spectrum)?;
        }
        AnalysisResult::Filter {
            series,
            linear_phase,
        } => match format {
            OutputFormat::Text => {
                writeln!(out, "Filtered Series")?;
                writeln!(out, "===============")?;
                writeln!(out, "Linear phase: {}", linear_phase)?;
                writeln!(out, "Samples:      {}", series.len())?;
                writeln!(out, "dt:           {}", series.dt.0)?;
                writeln!(out)?;
                for (t, v) in series.index_labels().iter().zip(series.samples.iter()) {
                    writeln!(out, "{:>14.6e}  {:>14.6e}", t, v)?;
                }
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "linear_phase": linear_phase.number(),
                    "index": series.index_labels(),
                    "samples": series.samples,
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
            }
            OutputFormat::Csv => {
                writeln!(out, "index,value")?;
                for (t, v) in series.index_labels().iter().zip(series.samples.iter()) {
                    writeln!(out, "{},{}", t, v)?;
                }
            }
        },
        AnalysisResult::Response(report) => write_response(out, format, report)?,
    }
    Ok(())
}

fn write_complex<W: Write>(
    out: &mut W,
    format: OutputFormat,
    title: &str,
    frequencies: &[f64],
    values: &[Complex64],
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "{}", title)?;
            writeln!(out, "{}", "=".repeat(title.len()))?;
            writeln!(out, "Bins: {}", values.len())?;
            writeln!(out)?;
            writeln!(out, "{:>14}  {:>14}  {:>14}  {:>14}", "frequency", "re", "im", "magnitude")?;
            for (f, v) in frequencies.iter().zip(values.iter()) {
                writeln!(out, "{:>14.6e}  {:>14.6e}  {:>14.6e}  {:>14.6e}", f, v.re, v.im, v.norm())?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "frequencies": frequencies,
                "re": values.iter().map(|v| v.re).collect::<Vec<_>>(),
                "im": values.iter().map(|v| v.im).collect::<Vec<_>>(),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Csv => {
            writeln!(out, "frequency,re,im,magnitude")?;
            for (f, v) in frequencies.iter().zip(values.iter()) {
                writeln!(out, "{},{},{},{}", f, v.re, v.im, v.norm())?;
            }
        }
    }
    Ok(())
}

fn write_response<W: Write>(out: &mut W, format: OutputFormat, report: &BandStatsMap) -> Result<()> {
    match format {
        OutputFormat::Text => report.write_report(out)?,
        OutputFormat::Json => {
            let json = serde_json::json!({
                "linear_phase": report.linear_phase().number(),
                "bands": report.iter().collect::<Vec<_>>(),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Csv => {
            writeln!(out, "band,name,lower,upper,desired,n,min,max,mean,median,sigma,median_deviation")?;
            for (i, band) in report.iter().enumerate() {
                writeln!(
                    out,
                    "{},{},{},{},{},{},{},{},{},{},{},{}",
                    i,
                    band.name.as_deref().unwrap_or(""),
                    band.lower,
                    band.upper,
                    band.desired,
                    band.stats.n,
                    band.stats.min,
                    band.stats.max,
                    band.stats.mean,
                    band.stats.median,
                    band.stats.sigma,
                    band.median_deviation
                )?;
            }
        }
    }
    Ok(())
}
