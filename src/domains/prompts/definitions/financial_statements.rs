//! Financial statement analysis prompt definition.

use super::{PromptDefinition, required_arg};
use rmcp::model::PromptArgument;

/// Guided read-through of one financial statement.
pub struct FinancialStatementAnalysisPrompt;

impl PromptDefinition for FinancialStatementAnalysisPrompt {
    const NAME: &'static str = "financial_statement_analysis";
    const DESCRIPTION: &'static str =
        "Analyze a company's income statement, balance sheet, or cash flow statement";

    fn template() -> &'static str {
        r#"Please analyze the {{statement_type}} statement for {{symbol}} and provide insights.

For your analysis:
1. Identify the most significant line items and explain their importance
2. Highlight any notable trends over the past few years
3. Calculate and interpret key ratios relevant to this statement
4. Compare the metrics to industry averages if possible
5. Point out any red flags or positive indicators
6. Provide context on how these financials impact the company's overall health

Be thorough but concise, focusing on the most important aspects that would matter to an investor."#
    }

    fn arguments() -> Vec<PromptArgument> {
        vec![
            required_arg("symbol", "Stock ticker symbol (e.g., AAPL, MSFT)"),
            required_arg(
                "statement_type",
                "Type of statement to analyze: income, balance, or cash-flow",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_statement_metadata() {
        assert_eq!(
            FinancialStatementAnalysisPrompt::NAME,
            "financial_statement_analysis"
        );
        let args = FinancialStatementAnalysisPrompt::arguments();
        assert_eq!(args.len(), 2);
        assert!(args.iter().all(|a| a.required == Some(true)));
        assert!(FinancialStatementAnalysisPrompt::template().contains("{{statement_type}}"));
    }
}
