//! Outreach text. Everything here is a pure function of the aggregates, so the
//! same upload always renders byte-identical templates.

use serde::Serialize;

use super::{
    csm::CsmGroup,
    lines::{LineKind, RooftopAggregate},
    normalize::first_name,
};

/// Width of the `=` divider between templates in a combined export.
pub const DIVIDER_WIDTH: usize = 80;

const DEALERSHIP_GREETING: &str = "Good morning [Dealership POC],";
const FORWARDING_REQUEST: &str = "To ensure you're getting the most out of your Numa subscription, please confirm that missed calls on the following users' direct lines are forwarding to their respective Numa IT forwarding lines after 4 rings (approximately 20 seconds), rather than going to local voicemail (including DND, busy, and after-hours scenarios):";
const ROSTER_REQUEST: &str = "If any of these users have left or changed desks, please reply with an updated list of desk phones for your team so we can keep forwarding in sync.";
const SUPPORT_CONTACT: &str =
    "If you have any questions, feel free to email us at support@numa.com.";

const CSM_INTRO: &str = "We've identified the following dealerships with low call volume over the past two weeks:";
const CSM_QUESTION: &str = "Could you please provide a point of contact for each location so we can reach out directly?";

/// One row of the manual desk-phone review table. Not part of the copied text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeskPhoneCandidate {
    pub display_name: String,
    pub raw_display_name: String,
    pub raw_name: String,
    pub phone_number: String,
    pub desk_phone: String,
    pub kind: LineKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealershipTemplate {
    pub rooftop_name: String,
    pub inbox_name: String,
    pub subject: String,
    pub body: String,
    pub line_count: usize,
    pub desk_phone_candidates: Vec<DeskPhoneCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsmTemplate {
    pub csm_owner: String,
    pub body: String,
    pub rooftop_count: usize,
}

/// Rendered templates of one kind plus their combined export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSet<T> {
    pub templates: Vec<T>,
    pub export: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Dealership,
    Csm,
}

pub fn dealership_subject(rooftop_name: &str, inbox_name: &str) -> String {
    format!("{} - {}: Phoneline forwarding", rooftop_name, inbox_name)
}

pub fn render_dealership(aggregate: &RooftopAggregate) -> DealershipTemplate {
    let mut body = String::new();
    push_line(&mut body, DEALERSHIP_GREETING);
    body.push('\n');
    push_line(
        &mut body,
        &format!(
            "We've recently noticed a drop in call volume on your account ({} – {})",
            aggregate.rooftop_name, aggregate.inbox_name
        ),
    );
    body.push('\n');
    push_line(&mut body, FORWARDING_REQUEST);
    for line in aggregate.ordered_lines() {
        push_line(
            &mut body,
            &format!(
                "• {} – Numa IT forwarding number: {}",
                line.display_name, line.phone_number
            ),
        );
    }
    body.push('\n');
    push_line(&mut body, ROSTER_REQUEST);
    body.push('\n');
    body.push_str(SUPPORT_CONTACT);

    let desk_phone_candidates = aggregate
        .ordered_lines()
        .map(|line| DeskPhoneCandidate {
            display_name: line.display_name.clone(),
            raw_display_name: line.raw_display_name.clone(),
            raw_name: line.raw_name.clone(),
            phone_number: line.phone_number.clone(),
            desk_phone: line.desk_phone.clone(),
            kind: line.kind,
        })
        .collect();

    DealershipTemplate {
        rooftop_name: aggregate.rooftop_name.clone(),
        inbox_name: aggregate.inbox_name.clone(),
        subject: dealership_subject(&aggregate.rooftop_name, &aggregate.inbox_name),
        body,
        line_count: aggregate.lines.len(),
        desk_phone_candidates,
    }
}

pub fn render_csm(group: &CsmGroup) -> CsmTemplate {
    let mut body = String::new();
    push_line(&mut body, &format!("Hi {},", first_name(&group.csm_owner)));
    body.push('\n');
    push_line(&mut body, CSM_INTRO);
    for rooftop in &group.rooftops {
        push_line(
            &mut body,
            &format!("• {} – {}", rooftop.rooftop_name, rooftop.inbox_name),
        );
    }
    body.push('\n');
    body.push_str(CSM_QUESTION);

    CsmTemplate {
        csm_owner: group.csm_owner.clone(),
        body,
        rooftop_count: group.rooftops.len(),
    }
}

fn push_line(body: &mut String, line: &str) {
    body.push_str(line);
    body.push('\n');
}

/// Concatenate bodies, each followed by a blank line, an 80-char `=` divider
/// and another blank line.
pub fn combined_export<'a, I>(bodies: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let divider = "=".repeat(DIVIDER_WIDTH);
    let mut out = String::new();
    for body in bodies {
        out.push_str(body);
        out.push_str("\n\n");
        out.push_str(&divider);
        out.push_str("\n\n");
    }
    out
}

pub fn summary_label(kind: TemplateKind, count: usize) -> String {
    match kind {
        TemplateKind::Dealership => format!(
            "✓ Generated {} dealership template(s) - One per rooftop",
            count
        ),
        TemplateKind::Csm => format!("✓ Generated {} CSM template(s) - One per CSM", count),
    }
}

pub fn render_dealerships(aggregates: &[RooftopAggregate]) -> TemplateSet<DealershipTemplate> {
    let templates: Vec<_> = aggregates.iter().map(render_dealership).collect();
    TemplateSet {
        export: combined_export(templates.iter().map(|t| t.body.as_str())),
        summary: summary_label(TemplateKind::Dealership, templates.len()),
        templates,
    }
}

pub fn render_csms(groups: &[CsmGroup]) -> TemplateSet<CsmTemplate> {
    let templates: Vec<_> = groups.iter().map(render_csm).collect();
    TemplateSet {
        export: combined_export(templates.iter().map(|t| t.body.as_str())),
        summary: summary_label(TemplateKind::Csm, templates.len()),
        templates,
    }
}
