//! Market outlook prompt definition.

use super::PromptDefinition;
use rmcp::model::PromptArgument;

/// Broad assessment of current market conditions. Takes no arguments.
pub struct MarketOutlookPrompt;

impl PromptDefinition for MarketOutlookPrompt {
    const NAME: &'static str = "market_outlook";
    const DESCRIPTION: &'static str =
        "Generate a market outlook and analysis of current conditions";

    fn template() -> &'static str {
        r#"Please provide a comprehensive outlook on the current market conditions.

Include in your analysis:
1. Current state of major market indexes (S&P 500, Dow Jones, NASDAQ)
2. Sector performance (identify strongest and weakest sectors)
3. Market sentiment indicators
4. Recent economic data and its impact on markets
5. Interest rate environment and monetary policy outlook
6. Key market risks and opportunities
7. Potential catalysts that could move markets in the near term
8. Overall market positioning recommendation (defensive, neutral, aggressive)

Base your analysis on the most recent available data, and be sure to consider both technical and fundamental factors in your assessment."#
    }

    fn arguments() -> Vec<PromptArgument> {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_outlook_has_no_arguments() {
        assert_eq!(MarketOutlookPrompt::NAME, "market_outlook");
        assert!(MarketOutlookPrompt::arguments().is_empty());
        assert!(!MarketOutlookPrompt::template().contains("{{"));
    }
}
