//! Investment idea generation prompt definition.

use super::{PromptDefinition, required_arg};
use rmcp::model::PromptArgument;

/// Screened investment ideas matching a stated criterion.
pub struct InvestmentIdeaGenerationPrompt;

impl PromptDefinition for InvestmentIdeaGenerationPrompt {
    const NAME: &'static str = "investment_idea_generation";
    const DESCRIPTION: &'static str = "Generate investment ideas based on specified criteria";

    fn template() -> &'static str {
        r#"Based on the criteria "{{criteria}}", please generate a list of promising investment ideas.

For each investment idea:
1. Identify the company/asset and provide a brief overview
2. Explain why it meets the specified criteria
3. Highlight key financial metrics that support the investment thesis
4. Discuss potential catalysts that could drive performance
5. Address key risks to be aware of
6. Suggest an appropriate position size or portfolio allocation

Aim to provide diverse ideas that align with the criteria while offering different risk/reward profiles. Use available financial tools and resources to inform your recommendations."#
    }

    fn arguments() -> Vec<PromptArgument> {
        vec![required_arg(
            "criteria",
            "Investment criteria (e.g., growth, value, dividend, sector)",
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_investment_ideas_metadata() {
        assert_eq!(
            InvestmentIdeaGenerationPrompt::NAME,
            "investment_idea_generation"
        );
        assert_eq!(InvestmentIdeaGenerationPrompt::arguments().len(), 1);
        assert!(InvestmentIdeaGenerationPrompt::template().contains("{{criteria}}"));
    }
}
