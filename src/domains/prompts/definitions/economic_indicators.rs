//! Economic indicator analysis prompt definition.

use super::{PromptDefinition, required_arg};
use rmcp::model::PromptArgument;

/// Market implications of one macroeconomic indicator.
pub struct EconomicIndicatorAnalysisPrompt;

impl PromptDefinition for EconomicIndicatorAnalysisPrompt {
    const NAME: &'static str = "economic_indicator_analysis";
    const DESCRIPTION: &'static str =
        "Analyze an economic indicator and its market implications";

    fn template() -> &'static str {
        r#"Please provide a detailed analysis of current {{indicator}} data and its implications for financial markets.

Include in your analysis:
1. Recent trends in {{indicator}} data
2. Historical context for current {{indicator}} levels
3. How {{indicator}} is likely to impact different asset classes (stocks, bonds, commodities, etc.)
4. Sectors that typically benefit or suffer from the current {{indicator}} environment
5. Central bank or government response to {{indicator}} trends
6. Forward-looking projections for {{indicator}}
7. Investment strategies appropriate for the current {{indicator}} environment

Provide specific examples of securities or sectors that may be particularly affected, with reasoning based on economic principles and historical market behavior."#
    }

    fn arguments() -> Vec<PromptArgument> {
        vec![required_arg(
            "indicator",
            "Economic indicator (e.g., inflation, GDP, unemployment, interest rates)",
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_economic_indicator_metadata() {
        assert_eq!(
            EconomicIndicatorAnalysisPrompt::NAME,
            "economic_indicator_analysis"
        );
        assert_eq!(EconomicIndicatorAnalysisPrompt::arguments().len(), 1);
        // The indicator name is woven through every numbered point
        assert!(EconomicIndicatorAnalysisPrompt::template().matches("{{indicator}}").count() > 5);
    }
}
