use crate::domain::{MonthlyNote, NoteAnalysis};

const MAX_ACHIEVEMENTS: usize = 4;
const MAX_HIGHLIGHTS: usize = 3;
const MAX_NOTE_RECOMMENDATIONS: usize = 3;
const MAX_RECOMMENDATIONS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Achievements,
    Content,
    Engagement,
    Recommendations,
    Insights,
}

/// Headers are matched by keyword or by their list marker anywhere in the
/// line, checked in section order.
const HEADERS: [(&str, &str, Section); 6] = [
    ("ACTIVITY SUMMARY", "1.", Section::Summary),
    ("KEY ACHIEVEMENTS", "2.", Section::Achievements),
    ("CONTENT PERFORMANCE", "3.", Section::Content),
    ("ENGAGEMENT HIGHLIGHTS", "4.", Section::Engagement),
    ("RECOMMENDATIONS", "5.", Section::Recommendations),
    ("AI INSIGHTS", "6.", Section::Insights),
];

fn header(line: &str) -> Option<Section> {
    let upper = line.to_uppercase();
    HEADERS
        .iter()
        .find(|(keyword, marker, _)| upper.contains(keyword) || line.contains(marker))
        .map(|(_, _, section)| *section)
}

fn bullet(line: &str) -> Option<String> {
    if line.starts_with('-') || line.starts_with('•') {
        Some(line.trim_start_matches(['-', '•', ' ']).to_string())
    } else {
        None
    }
}

fn append(target: &mut String, line: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(line);
}

/// Split a model answer into the sections of a monthly note.
pub fn parse_monthly_note(month: &str, response: &str) -> MonthlyNote {
    let mut activity_summary = String::new();
    let mut key_achievements = Vec::new();
    let mut analysis = String::new();
    let mut engagement_highlights = Vec::new();
    let mut recommendations = Vec::new();
    let mut ai_insights = String::new();

    let mut current = None;
    for line in response.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(section) = header(line) {
            current = Some(section);
            continue;
        }

        match current {
            Some(Section::Summary) => append(&mut activity_summary, line),
            Some(Section::Achievements) => key_achievements.extend(bullet(line)),
            Some(Section::Content) => append(&mut analysis, line),
            Some(Section::Engagement) => engagement_highlights.extend(bullet(line)),
            Some(Section::Recommendations) => recommendations.extend(bullet(line)),
            Some(Section::Insights) => append(&mut ai_insights, line),
            None => {}
        }
    }

    key_achievements.truncate(MAX_ACHIEVEMENTS);
    engagement_highlights.truncate(MAX_HIGHLIGHTS);
    recommendations.truncate(MAX_NOTE_RECOMMENDATIONS);

    MonthlyNote {
        month: month.to_string(),
        activity_summary,
        key_achievements,
        content_performance: NoteAnalysis {
            analysis: (!analysis.is_empty()).then_some(analysis),
        },
        engagement_highlights,
        recommendations,
        ai_insights,
    }
}

/// Pull list items out of a model answer. Only the characters `1`-`9`, `-`,
/// `•` and space are stripped from the front, so `"1. Post more"` keeps its
/// leading `". "`.
pub fn parse_recommendations(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.starts_with(|ch: char| ch.is_ascii_digit())
                || line.starts_with('-')
                || line.starts_with('•')
        })
        .map(|line| {
            line.trim_start_matches(|ch: char| matches!(ch, '1'..='9' | '-' | '•' | ' '))
                .to_string()
        })
        .filter(|item| !item.is_empty())
        .take(MAX_RECOMMENDATIONS)
        .collect()
}
