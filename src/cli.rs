// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn today_arg() -> Arg {
    Arg::new("today")
        .long("today")
        .value_name("YYYY-MM-DD")
        .help("Date used to pick the week of month (defaults to today)")
}

fn week_arg() -> Arg {
    Arg::new("week")
        .long("week")
        .value_parser(value_parser!(u32))
        .help("Week of month, 1-6")
}

fn capital_cmd() -> Command {
    Command::new("capital")
        .about("Capital ledger and monthly growth schedule")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("show").about("Show the ledger and its monthly schedule"),
        ))
        .subcommand(
            Command::new("edit")
                .about("Edit ledger-level capital or growth target")
                .arg(Arg::new("initial").long("initial").help("Initial capital"))
                .arg(Arg::new("current").long("current").help("Current capital"))
                .arg(
                    Arg::new("growth")
                        .long("growth")
                        .help("Monthly growth target in percent, e.g. 20"),
                ),
        )
        .subcommand(
            Command::new("month-edit")
                .about("Re-base one month's starting capital and roll later months forward")
                .arg(
                    Arg::new("month")
                        .long("month")
                        .required(true)
                        .value_name("YYYY-MM"),
                )
                .arg(Arg::new("initial").long("initial").required(true)),
        )
        .subcommand(
            Command::new("schedule")
                .about("Regenerate the schedule from a new start month")
                .arg(
                    Arg::new("start")
                        .long("start")
                        .required(true)
                        .value_name("YYYY-MM"),
                )
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(u32))
                        .default_value("36"),
                ),
        )
        .subcommand(Command::new("advance").about("Move to the next month"))
        .subcommand(Command::new("revert").about("Move back to the previous month"))
        .subcommand(
            Command::new("reset")
                .about("Discard progress and restart from the first month")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Confirm the reset"),
                ),
        )
        .subcommand(json_flags(
            Command::new("projection")
                .about("Preview a compound growth schedule without saving it")
                .arg(Arg::new("initial").long("initial").required(true))
                .arg(
                    Arg::new("growth")
                        .long("growth")
                        .required(true)
                        .help("Monthly growth in percent"),
                )
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(u32))
                        .default_value("36"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .value_name("YYYY-MM")
                        .default_value("2025-04"),
                ),
        ))
}

fn bet_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("match")
            .long("match")
            .required(required)
            .help("Match, e.g. 'Arsenal v Chelsea'"),
    )
    .arg(Arg::new("league").long("league").required(required))
    .arg(
        Arg::new("date")
            .long("date")
            .value_name("YYYY-MM-DD")
            .help("Match date (defaults to today)"),
    )
    .arg(Arg::new("odds").long("odds").required(required))
    .arg(Arg::new("stake").long("stake").required(required))
    .arg(
        Arg::new("type")
            .long("type")
            .help("Win, Draw, Over, Under, BTTS or Other"),
    )
    .arg(
        Arg::new("result")
            .long("result")
            .help("Win, Loss or Pending"),
    )
    .arg(Arg::new("notes").long("notes"))
}

fn bet_cmd() -> Command {
    Command::new("bet")
        .about("Record and manage bets")
        .subcommand_required(true)
        .subcommand(bet_fields(Command::new("add").about("Record a bet"), true).arg(today_arg()))
        .subcommand(bet_fields(
            Command::new("edit")
                .about("Edit a bet")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
            false,
        ))
        .subcommand(
            Command::new("rm").about("Delete a bet").arg(
                Arg::new("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(json_flags(
            Command::new("show").about("Show one bet").arg(
                Arg::new("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        ))
        .subcommand(json_flags(
            Command::new("list")
                .about("List bets, newest first")
                .arg(
                    Arg::new("month")
                        .long("month")
                        .value_name("YYYY-MM"),
                )
                .arg(week_arg())
                .arg(Arg::new("result").long("result"))
                .arg(Arg::new("league").long("league"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    Arg::new("skip")
                        .long("skip")
                        .value_parser(value_parser!(usize))
                        .default_value("0"),
                ),
        ))
}

fn plan_cmd() -> Command {
    Command::new("plan")
        .about("Weekly betting plans for the current month")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("show")
                .about("Show a week's plan and what it still takes to hit target")
                .arg(week_arg())
                .arg(today_arg()),
        ))
        .subcommand(
            Command::new("set")
                .about("Create or update a week's plan")
                .arg(week_arg())
                .arg(today_arg())
                .arg(
                    Arg::new("target-bets")
                        .long("target-bets")
                        .value_parser(value_parser!(i64))
                        .default_value("5"),
                )
                .arg(Arg::new("odds").long("odds").default_value("1.8"))
                .arg(
                    Arg::new("unit")
                        .long("unit")
                        .help("Unit size in percent of the month's starting capital"),
                ),
        )
        .subcommand(json_flags(
            Command::new("list").about("List plans of the current month"),
        ))
}

pub fn build_cli() -> Command {
    Command::new("stakeplan")
        .about("Betting bankroll planner with compound monthly growth targets")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database and capital ledger"))
        .subcommand(capital_cmd())
        .subcommand(bet_cmd())
        .subcommand(plan_cmd())
        .subcommand(json_flags(
            Command::new("stats")
                .about("Win rate, ROI and breakdowns by league and bet type")
                .arg(
                    Arg::new("month")
                        .long("month")
                        .value_name("YYYY-MM"),
                )
                .arg(week_arg())
                .arg(Arg::new("league").long("league")),
        ))
        .subcommand(json_flags(
            Command::new("summary").about("Week-by-week rollup of the current month"),
        ))
        .subcommand(
            Command::new("settings")
                .about("Growth target and default unit size")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("growth")
                                .long("growth")
                                .help("Monthly growth target in percent"),
                        )
                        .arg(
                            Arg::new("unit")
                                .long("unit")
                                .help("Default unit size in percent"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("bets")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv or json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check ledger consistency"))
}
