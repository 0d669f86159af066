//! Comprehensive company analysis prompt definition.

use super::{PromptDefinition, required_arg};
use rmcp::model::PromptArgument;

/// Full investment analysis of a single company.
pub struct CompanyAnalysisPrompt;

impl PromptDefinition for CompanyAnalysisPrompt {
    const NAME: &'static str = "company_analysis";
    const DESCRIPTION: &'static str =
        "Generate a comprehensive analysis of a company as an investment opportunity";

    fn template() -> &'static str {
        r#"Please provide a comprehensive analysis of {{symbol}} as an investment opportunity.

Include the following in your analysis:
1. Company overview and business model
2. Financial health assessment (revenue growth, profitability, debt levels)
3. Competitive position and market trends
4. Key strengths, weaknesses, opportunities, and threats
5. Valuation analysis (P/E ratio, PEG, price-to-book compared to peers and historical averages)
6. Recent news and developments that might impact the stock
7. Summary and investment recommendation (buy, hold, or sell)

Base your analysis on the financial data and company information available through the tools and resources."#
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
    fn test_company_analysis_metadata() {
        assert_eq!(CompanyAnalysisPrompt::NAME, "company_analysis");
        let args = CompanyAnalysisPrompt::arguments();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name, "symbol");
        assert_eq!(args[0].required, Some(true));
        assert!(CompanyAnalysisPrompt::template().contains("{{symbol}}"));
    }
}
