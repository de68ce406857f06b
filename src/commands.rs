//! Subcommand execution.
//!
//! Each command produces a [`Report`] carrying both renderings, so the
//! caller only picks the output format.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::{json, Value};
use tracing::debug;

use ladder_core::{
    bucket_range, index_to_price, ladder, price_to_index, to_wad, wdiv, wmul, wsqrt, Bucket, Wad,
};

use crate::config::TableConfig;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Price of the bucket at an index
    Price {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Bucket index a price falls into
    Index {
        #[arg(allow_negative_numbers = true)]
        price: String,
    },
    /// Every bucket between two prices
    Range { min: String, max: String },
    /// Ladder rows, highest price first
    Table {
        #[arg(long)]
        from: Option<u32>,
        #[arg(long)]
        to: Option<u32>,
        #[arg(long)]
        step: Option<u32>,
    },
    /// WAD multiplication, rounded half up
    Mul {
        #[arg(allow_negative_numbers = true)]
        a: String,
        #[arg(allow_negative_numbers = true)]
        b: String,
    },
    /// WAD division, rounded half up
    Div {
        #[arg(allow_negative_numbers = true)]
        a: String,
        #[arg(allow_negative_numbers = true)]
        b: String,
    },
    /// WAD square root, floored
    Sqrt {
        #[arg(allow_negative_numbers = true)]
        a: String,
    },
}

/// Result of a command in both output formats.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub text: String,
    pub json: Value,
}

impl Report {
    fn value(value: Wad) -> Self {
        Self {
            text: value.to_string(),
            json: json!({ "value": value }),
        }
    }

    fn buckets(buckets: &[Bucket]) -> Self {
        let text = buckets
            .iter()
            .map(|bucket| format!("{:>5}  {}", bucket.index, bucket.price))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            text,
            json: json!({ "buckets": buckets }),
        }
    }
}

fn parse(label: &str, input: &str) -> Result<Wad> {
    to_wad(input).with_context(|| format!("invalid {label} {input:?}"))
}

/// Run a command against the table defaults from the active profile.
pub fn run(command: &Command, defaults: &TableConfig) -> Result<Report> {
    debug!(?command, "running command");
    let report = match command {
        Command::Price { index } => {
            let price = index_to_price(*index).context("price lookup failed")?;
            Report {
                text: price.to_string(),
                json: json!({ "index": index, "price": price }),
            }
        }
        Command::Index { price } => {
            let price = parse("price", price)?;
            let index = price_to_index(price).context("index lookup failed")?;
            Report {
                text: index.to_string(),
                json: json!({ "price": price, "index": index }),
            }
        }
        Command::Range { min, max } => {
            let (min, max) = (parse("min price", min)?, parse("max price", max)?);
            let buckets = bucket_range(min, max)
                .context("range lookup failed")?
                .map(Bucket::at)
                .collect::<ladder_core::Result<Vec<_>>>()?;
            Report::buckets(&buckets)
        }
        Command::Table { from, to, step } => {
            let from = from.unwrap_or(defaults.from);
            let to = to.unwrap_or(defaults.to);
            let step = step.unwrap_or(defaults.step);
            let rows = ladder(from, to, step).context("ladder table failed")?;
            Report::buckets(&rows)
        }
        Command::Mul { a, b } => Report::value(wmul(parse("operand", a)?, parse("operand", b)?)?),
        Command::Div { a, b } => Report::value(wdiv(parse("dividend", a)?, parse("divisor", b)?)?),
        Command::Sqrt { a } => Report::value(wsqrt(parse("operand", a)?)?),
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladder_core::MathError;
    use test_case::test_case;

    fn run_default(command: Command) -> Result<Report> {
        run(&command, &TableConfig::default())
    }

    #[test_case(Command::Price { index: 2632 }, "2000.221618840727700609" ; "price")]
    #[test_case(Command::Index { price: "2000".into() }, "2632" ; "index")]
    #[test_case(Command::Mul { a: "500".into(), b: "1.53".into() }, "765.0" ; "mul")]
    #[test_case(Command::Div { a: "20140520".into(), b: "8".into() }, "2517565.0" ; "div")]
    #[test_case(Command::Sqrt { a: "0.0923201".into() }, "0.303842228796459429" ; "sqrt")]
    fn test_text_output(command: Command, expected: &str) {
        assert_eq!(run_default(command).unwrap().text, expected);
    }

    #[test]
    fn test_json_output() {
        let report = run_default(Command::Price { index: 4156 }).unwrap();
        assert_eq!(report.json, json!({ "index": 4156, "price": "1.0" }));
    }

    #[test]
    fn test_range_lists_every_bucket() {
        let report = run_default(Command::Range {
            min: "100".into(),
            max: "2000".into(),
        })
        .unwrap();
        assert_eq!(report.text.lines().count(), 601);
        assert_eq!(report.json["buckets"][0]["index"], 2632);
        assert_eq!(report.json["buckets"][600]["index"], 3232);
    }

    #[test]
    fn test_table_uses_defaults() {
        let defaults = TableConfig {
            from: 4150,
            to: 4160,
            step: 5,
        };
        let report = run(
            &Command::Table {
                from: None,
                to: None,
                step: None,
            },
            &defaults,
        )
        .unwrap();
        assert_eq!(report.text.lines().count(), 3);

        let report = run(
            &Command::Table {
                from: Some(4156),
                to: Some(4156),
                step: None,
            },
            &defaults,
        )
        .unwrap();
        assert_eq!(report.text, " 4156  1.0");
    }

    #[test]
    fn test_errors_keep_the_typed_cause() {
        let err = run_default(Command::Price { index: 9999 }).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MathError>(),
            Some(&MathError::BucketIndexOutOfBounds(9999))
        );

        let err = run_default(Command::Index {
            price: "1222333444".into(),
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("ERR_BUCKET_PRICE_OUT_OF_BOUNDS"));

        assert!(run_default(Command::Sqrt { a: "-4".into() }).is_err());
        assert!(run_default(Command::Div {
            a: "1".into(),
            b: "0".into()
        })
        .is_err());
        assert!(run_default(Command::Mul {
            a: "1.0000000000000000001".into(),
            b: "1".into()
        })
        .is_err());
    }
}
