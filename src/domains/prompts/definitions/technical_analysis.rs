//! Technical analysis prompt definition.

use super::{PromptDefinition, required_arg};
use rmcp::model::PromptArgument;

/// Chart-driven technical read of a single stock.
pub struct TechnicalAnalysisPrompt;

impl PromptDefinition for TechnicalAnalysisPrompt {
    const NAME: &'static str = "technical_analysis";
    const DESCRIPTION: &'static str = "Perform technical analysis on a stock";

    fn template() -> &'static str {
        r#"Please perform a comprehensive technical analysis for {{symbol}}.

In your analysis, include:
1. Current price action and trend direction
2. Key support and resistance levels
3. Analysis of volume patterns
4. Important technical indicators (moving averages, RSI, MACD, etc.)
5. Chart patterns and formations
6. Identification of potential entry and exit points
7. Overall technical outlook (bullish, bearish, or neutral)

Base your analysis on the available historical price data and standard technical analysis principles. Provide specific price levels where possible and explain the significance of key technical signals."#
    }

    fn arguments() -> Vec<PromptArgument> {
        vec![required_arg(
            "symbol",
            "Stock ticker symbol (e.g., AAPL, MSFT)",
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technical_analysis_metadata() {
        assert_eq!(TechnicalAnalysisPrompt::NAME, "technical_analysis");
        assert_eq!(TechnicalAnalysisPrompt::arguments().len(), 1);
        assert!(TechnicalAnalysisPrompt::template().contains("{{symbol}}"));
    }
}
