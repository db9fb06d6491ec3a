use std::path::Path;

use pressquote_core::config::{AppConfig, LoadOptions};
use pressquote_core::cpq::{
    DeterministicQuotationRuntime, QuotationEvaluationInput, QuotationRuntime,
};
use pressquote_core::display::format_amount;
use pressquote_core::{ApplicationError, PricingPipeline, PricingResult, Totals};
use tracing::{info, warn};

use crate::commands::{input, CommandResult};

pub fn run(path: &Path, pipeline: Option<PricingPipeline>, json_output: bool) -> CommandResult {
    let correlation_id = path.display().to_string();
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            let error = ApplicationError::Configuration(error.to_string());
            return CommandResult::failure("price", error, &correlation_id);
        }
    };
    let pipeline = pipeline.unwrap_or(config.pricing.pipeline);

    let snapshot = match input::load_snapshot(path, &config) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            warn!(
                event_name = "cli.price.snapshot_rejected",
                correlation_id = %correlation_id,
                error = %error,
                "snapshot could not be loaded"
            );
            let error = ApplicationError::Input(format!("{error:#}"));
            return CommandResult::failure("price", error, &correlation_id);
        }
    };
    info!(
        event_name = "cli.price.snapshot_loaded",
        correlation_id = %correlation_id,
        process_count = snapshot.processes.len(),
        pipeline = %pipeline,
        "snapshot loaded"
    );

    let runtime = DeterministicQuotationRuntime::default();
    let evaluation = match runtime.evaluate(QuotationEvaluationInput {
        snapshot: &snapshot,
        pipeline,
        policy: config.pricing.input_policy,
    }) {
        Ok(evaluation) => evaluation,
        Err(error) => {
            warn!(
                event_name = "cli.price.rejected",
                correlation_id = %correlation_id,
                error = %error,
                "snapshot could not be priced"
            );
            return CommandResult::failure("price", error.into(), &correlation_id);
        }
    };

    for violation in &evaluation.validation.violations {
        warn!(
            event_name = "cli.price.input_warning",
            correlation_id = %correlation_id,
            code = %violation.code,
            "{}",
            violation.message
        );
    }
    info!(
        event_name = "cli.price.priced",
        correlation_id = %correlation_id,
        grand_total = %evaluation.pricing.totals.grand_total(),
        "quotation priced"
    );

    if json_output {
        let message = format!(
            "priced {} process line(s) via {pipeline} pipeline",
            evaluation.pricing.lines.len()
        );
        return CommandResult::success_with("price", message, Some(evaluation));
    }

    CommandResult {
        exit_code: 0,
        output: render_human(&evaluation.pricing, &config.pricing.currency_symbol),
    }
}

fn render_human(result: &PricingResult, symbol: &str) -> String {
    let money = |amount| format_amount(amount, symbol);
    let board = &result.board;

    let mut lines = vec![
        "board:".to_string(),
        format!("  single board rate      {}", money(board.single_board_rate)),
        format!("  boards required        {}", board.boards_required),
        format!("  total boards required  {}", board.total_boards_required),
        format!("  total board rate       {}", money(board.total_board_rate)),
        "processes:".to_string(),
    ];

    if result.lines.is_empty() {
        lines.push("  (none)".to_string());
    }
    for line in &result.lines {
        lines.push(format!(
            "  {}. {:<30} rate {:>14}  cost {:>14}",
            line.order,
            line.process_type.label(),
            money(line.display_rate),
            money(line.total_cost)
        ));
    }
    lines.push(format!("  total process cost     {}", money(result.total_process_cost)));

    lines.push("totals:".to_string());
    match &result.totals {
        Totals::Simple(totals) => {
            lines.push(format!("  subtotal               {}", money(totals.subtotal)));
            lines.push(format!("  tax                    {}", money(totals.tax)));
            lines.push(format!("  discount               {}", money(totals.discount)));
            lines.push(format!("  grand total            {}", money(totals.grand_total)));
        }
        Totals::Builder(totals) => {
            lines.push(format!("  total rate             {}", money(totals.total_rate)));
            lines.push(format!("  single box rate        {}", money(totals.single_box_rate)));
            lines.push(format!("  margin                 {}", money(totals.margin_amount)));
            lines.push(format!("  rate with margin       {}", money(totals.rate_with_margin)));
            lines.push(format!("  tax                    {}", money(totals.tax)));
            lines.push(format!("  grand total            {}", money(totals.grand_total)));
        }
    }

    lines.join("\n")
}
