//! Pipeline stage templates
//!
//! Builds the three fixed stage descriptors (research, analysis, proposal)
//! and their agent roles for a given company. Deterministic, no I/O: the
//! same company and options always produce the same descriptors.

use std::path::PathBuf;
use usecase_proposer_sdk::{PipelineOptions, RoleDescriptor, StageDescriptor};

use crate::artifacts::STAGE_ARTIFACTS;

/// Shortcut companies offered in the UI
pub const EXAMPLE_COMPANIES: [&str; 4] = ["Tesla", "Netflix", "Siemens", "Pfizer"];

const RESEARCHER: &str = "Researcher";
const ANALYST: &str = "Analyst";
const PROPOSAL_WRITER: &str = "Proposal Writer";

/// The three agent roles, in pipeline order
pub fn build_roles() -> Vec<RoleDescriptor> {
    vec![
        RoleDescriptor {
            name: RESEARCHER.to_string(),
            goal: "Collect data about the company's industry segment, key offerings, \
                   and strategic focus areas."
                .to_string(),
            backstory: "Experienced market researcher specializing in analyzing \
                        industries and companies."
                .to_string(),
        },
        RoleDescriptor {
            name: ANALYST.to_string(),
            goal: "Analyze research data to identify AI/ML use cases.".to_string(),
            backstory: "Seasoned data analyst with expertise in AI/ML applications."
                .to_string(),
        },
        RoleDescriptor {
            name: PROPOSAL_WRITER.to_string(),
            goal: "Generate a detailed proposal with prioritized use cases.".to_string(),
            backstory: "Professional technical writer specializing in AI/ML concepts."
                .to_string(),
        },
    ]
}

/// The three stage descriptors for one run, goal text interpolated with
/// the company name
pub fn build_stages(company: &str, options: &PipelineOptions) -> Vec<StageDescriptor> {
    let roles = build_roles();
    let company = company.trim();

    let mut analysis_goal = format!(
        "Analyze the research findings on {} to identify concrete AI/ML use cases \
         across its operations and offerings.",
        company
    );
    if options.include_competitors {
        analysis_goal.push_str(
            " Compare against the main competitors in the same industry segment and \
             note use cases where they are ahead.",
        );
    }

    vec![
        StageDescriptor {
            role: roles[0].name.clone(),
            goal: format!(
                "Conduct in-depth research on {}: its industry segment, key offerings, \
                 and strategic focus areas.",
                company
            ),
            backstory: roles[0].backstory.clone(),
            expected_output: "Detailed summary of industry segment, key offerings, and \
                              strategic focus areas."
                .to_string(),
            output_file: PathBuf::from(STAGE_ARTIFACTS[0].1),
        },
        StageDescriptor {
            role: roles[1].name.clone(),
            goal: analysis_goal,
            backstory: roles[1].backstory.clone(),
            expected_output: "List of actionable AI/ML use cases with feasibility analysis."
                .to_string(),
            output_file: PathBuf::from(STAGE_ARTIFACTS[1].1),
        },
        StageDescriptor {
            role: roles[2].name.clone(),
            goal: format!(
                "Create the final proposal for {} listing the top AI/ML use cases, \
                 prioritized by impact and feasibility.",
                company
            ),
            backstory: roles[2].backstory.clone(),
            expected_output: "Structured report with prioritized use cases and references."
                .to_string(),
            output_file: PathBuf::from(STAGE_ARTIFACTS[2].1),
        },
    ]
}
