// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::pnl::Column;
use clap::{Arg, ArgAction, Command, builder::PossibleValuesParser, value_parser};
use std::path::PathBuf;

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn month_filter() -> Arg {
    Arg::new("month")
        .long("month")
        .short('m')
        .action(ArgAction::Append)
        .help("Month to show (Jan..Dec or All); repeat to compare several")
}

pub fn build_cli() -> Command {
    Command::new("pnlboard")
        .version(clap::crate_version!())
        .about("Monthly profit & loss dashboard for small businesses")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .env("PNLBOARD_DATA_DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding state files and logos"),
        )
        .arg(
            Arg::new("business")
                .long("business")
                .short('b')
                .global(true)
                .env("PNLBOARD_BUSINESS")
                .help("Business display name; created on first write"),
        )
        .subcommand(
            Command::new("business")
                .about("List, inspect and reset businesses")
                .subcommand(Command::new("list").about("Businesses found in the data dir"))
                .subcommand(json_flags(
                    Command::new("show").about("Profile, settings and logo of a business"),
                ))
                .subcommand(Command::new("reset").about("Delete all stored values of a business"))
                .subcommand(
                    Command::new("logo")
                        .about("Store or remove the business logo")
                        .arg(
                            Arg::new("path")
                                .long("path")
                                .help("PNG or JPEG file")
                                .conflicts_with("remove")
                                .required_unless_present("remove"),
                        )
                        .arg(Arg::new("remove").long("remove").action(ArgAction::SetTrue)),
                ),
        )
        .subcommand(
            Command::new("input")
                .about("Enter monthly values for a category")
                .arg(
                    Arg::new("category")
                        .required(true)
                        .help("Revenue, Target Revenue, COGS, Target Expenses, Marketing, Salaries, Utilities, Rent, Other Expenses, or a custom category"),
                )
                .arg(
                    Arg::new("values")
                        .long("values")
                        .help("Comma-separated amounts, Jan first; missing months are 0")
                        .conflicts_with_all(["month", "value"])
                        .required_unless_present("month"),
                )
                .arg(
                    Arg::new("month")
                        .long("month")
                        .short('m')
                        .requires("value")
                        .help("Single month to set (Jan..Dec)"),
                )
                .arg(Arg::new("value").long("value").requires("month")),
        )
        .subcommand(json_flags(
            Command::new("settings")
                .about("Show or update tax rate, growth rate, year, name and custom categories")
                .arg(Arg::new("tax-rate").long("tax-rate").help("Percent, 0-100"))
                .arg(Arg::new("growth-rate").long("growth-rate").help("Percent, 0-100"))
                .arg(Arg::new("year").long("year"))
                .arg(Arg::new("name").long("name").help("Name printed on reports"))
                .arg(
                    Arg::new("custom-categories")
                        .long("custom-categories")
                        .help("Comma-separated expense categories, e.g. \"Taxes, Insurance\""),
                ),
        ))
        .subcommand(json_flags(
            Command::new("report")
                .about("Profit & loss table")
                .arg(month_filter()),
        ))
        .subcommand(json_flags(
            Command::new("chart")
                .about("Raw series for plotting one column")
                .arg(
                    Arg::new("metric")
                        .long("metric")
                        .required(true)
                        .value_parser(PossibleValuesParser::new(Column::ALL.map(Column::key))),
                )
                .arg(month_filter()),
        ))
        .subcommand(
            Command::new("export")
                .about("Write the full report to a file")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .required(true)
                        .help("csv|json"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(Command::new("doctor").about("Check stored values for problems"))
}
