//! Multi-stock comparison prompt definition.

use super::{PromptDefinition, required_arg};
use rmcp::model::PromptArgument;

/// Side-by-side comparison of several stocks.
pub struct StockComparisonPrompt;

impl PromptDefinition for StockComparisonPrompt {
    const NAME: &'static str = "stock_comparison";
    const DESCRIPTION: &'static str = "Compare multiple stocks for investment decision-making";

    fn template() -> &'static str {
        r#"Please compare the following stocks: {{symbols}}.

Provide a detailed comparison including:
1. Business overview for each company
2. Financial performance metrics (growth rates, margins, ROE, etc.)
3. Valuation metrics (P/E, P/S, PEG, etc.)
4. Dividend information if applicable
5. Recent stock performance
6. Strengths and weaknesses of each company
7. Competitive positioning within their industry
8. Future growth prospects

Conclude with a ranking of these stocks from most to least attractive investment opportunity based on the data, and explain your reasoning.

Use available financial tools and resources to gather the necessary data for your analysis."#
    }

    fn arguments() -> Vec<PromptArgument> {
        vec![required_arg(
            "symbols",
            "Comma-separated list of stock symbols (e.g., AAPL,MSFT,GOOGL)",
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_comparison_metadata() {
        assert_eq!(StockComparisonPrompt::NAME, "stock_comparison");
        assert_eq!(StockComparisonPrompt::arguments().len(), 1);
        assert!(StockComparisonPrompt::template().contains("{{symbols}}"));
    }
}
