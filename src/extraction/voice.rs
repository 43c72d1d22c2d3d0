//! Voice symptom post-processing: the fixed analysis layout and the patient
//! details a speaker mentions in their transcript.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

/// Patient details spoken in a transcript. Every field is a best guess.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub duration: Option<String>,
    pub body_location: Option<String>,
}

// ── Analysis layout ───────────────────────────────────────

struct Section {
    heading: &'static str,
    keywords: &'static [&'static str],
}

/// Output order of the voice analysis layout.
const SECTIONS: [Section; 9] = [
    Section {
        heading: "Summary",
        keywords: &["summary", "clinical summary"],
    },
    Section {
        heading: "Key Symptoms",
        keywords: &["key symptoms", "symptoms"],
    },
    Section {
        heading: "Duration",
        keywords: &["duration"],
    },
    Section {
        heading: "Severity",
        keywords: &["severity"],
    },
    Section {
        heading: "Possible Causes",
        keywords: &["possible causes", "causes"],
    },
    Section {
        heading: "Red Flag Warnings",
        keywords: &["red flag", "warnings"],
    },
    Section {
        heading: "Patient-Friendly Explanation",
        keywords: &["patient-friendly", "explanation"],
    },
    Section {
        heading: "Doctor Summary",
        keywords: &["doctor summary", "doctor-style"],
    },
    Section {
        heading: "Recommended Next Steps",
        keywords: &["recommended next steps", "next steps"],
    },
];

const DOCTOR_SECTION: usize = 7;

/// Rearrange a free-form voice analysis into the nine numbered sections.
///
/// A line containing a section keyword starts that section; anything after
/// its first `:` is kept as content. Lines before the first header are
/// dropped and empty sections read `-`.
pub fn format_analysis_markdown(text: &str) -> String {
    let cleaned = text.replace("```", "").replace("\\n", "\n");
    let mut bodies: [Vec<&str>; 9] = Default::default();
    let mut current = None;

    for line in cleaned.trim().lines().map(str::trim) {
        if let Some(idx) = section_for_header(&line.to_lowercase()) {
            current = Some(idx);
            if let Some(inline) = inline_content(line) {
                bodies[idx].push(inline);
            }
            continue;
        }
        if let Some(idx) = current {
            if !is_bare_list_marker(line) {
                bodies[idx].push(line);
            }
        }
    }

    SECTIONS
        .iter()
        .zip(&bodies)
        .enumerate()
        .map(|(i, (section, lines))| {
            let body = lines.join("\n");
            let body = match body.trim() {
                "" => "-",
                text => text,
            };
            format!("{}. **{}:**\n{}", i + 1, section.heading, body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Strip trailing spaces and collapse runs of blank lines to one.
pub fn remove_large_gaps(text: &str) -> String {
    static TRAILING_SPACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[ \t]+\n").expect("valid regex"));
    static BLANK_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    let stripped = TRAILING_SPACE_RE.replace_all(text, "\n");
    BLANK_RUN_RE.replace_all(&stripped, "\n\n").into_owned()
}

/// Layout applied to every voice analysis before it is returned.
pub fn layout_voice_analysis(text: &str) -> String {
    remove_large_gaps(&format_analysis_markdown(text))
        .trim()
        .to_string()
}

fn section_for_header(lower: &str) -> Option<usize> {
    let matches = |section: &Section| section.keywords.iter().any(|k| lower.contains(k));
    // Doctor headers also contain "summary"
    if matches(&SECTIONS[DOCTOR_SECTION]) {
        return Some(DOCTOR_SECTION);
    }
    SECTIONS.iter().position(matches)
}

fn inline_content(header: &str) -> Option<&str> {
    let (_, rest) = header.split_once(':')?;
    let rest = rest.trim_matches(|c: char| c == '*' || c.is_whitespace());
    (!rest.is_empty()).then_some(rest)
}

fn is_bare_list_marker(line: &str) -> bool {
    line.strip_suffix('.')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

// ── Patient details ───────────────────────────────────────

static NAME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)my name is ([A-Za-z ]+)",
        r"(?i)\bi am ([A-Za-z ]+)",
        r"(?i)\bi'm ([A-Za-z ]+)",
        r"(?i)this is ([A-Za-z ]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});
static GREETING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:hi|hello|hey)[, ]+").expect("valid regex"));
static AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2})[- ]?year[- ]?old").expect("valid regex"));
static MALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmale\b").expect("valid regex"));
static FEMALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfemale\b").expect("valid regex"));
static SYMPTOMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bi have (.*?)(?:\.|$)").expect("valid regex"));
static SYMPTOM_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),|\band\b").expect("valid regex"));
static BODY_LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:pain|pimples|rash|injury|swelling|discomfort) (?:on|in|at) ([A-Za-z ]+)")
        .expect("valid regex")
});
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)for (\d+ (?:days?|weeks?|months?|years?))").expect("valid regex")
});

const MALE_FIRST_NAMES: &[&str] = &[
    "adam", "ahmed", "ali", "andrew", "anthony", "benjamin", "brian", "carlos", "charles",
    "christopher", "daniel", "david", "edward", "george", "henry", "jack", "james", "jason",
    "john", "jose", "joseph", "kevin", "mark", "matthew", "michael", "mohammed", "paul",
    "peter", "raj", "richard", "robert", "samuel", "steven", "thomas", "william",
];

const FEMALE_FIRST_NAMES: &[&str] = &[
    "aisha", "alice", "amanda", "anna", "barbara", "elizabeth", "emily", "emma", "fatima",
    "grace", "hannah", "jennifer", "jessica", "karen", "laura", "linda", "lisa", "maria",
    "mary", "michelle", "nancy", "olivia", "patricia", "priya", "rachel", "rebecca", "sarah",
    "sophia", "susan", "victoria",
];

/// Pull name, age, sex, symptoms, duration and body location out of a
/// spoken transcript. Fields that are not mentioned stay empty.
pub fn extract_patient_info(transcript: &str) -> PatientInfo {
    let name = spoken_name(transcript);
    let sex = spoken_sex(transcript).or_else(|| name.as_deref().and_then(guess_sex_from_name));

    PatientInfo {
        age: AGE_RE
            .captures(transcript)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok()),
        symptoms: spoken_symptoms(transcript),
        duration: DURATION_RE
            .captures(transcript)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
        body_location: BODY_LOCATION_RE
            .captures(transcript)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|loc| !loc.is_empty()),
        name,
        sex,
    }
}

/// Sex commonly associated with a first name; `None` for unknown or
/// unisex names.
pub fn guess_sex_from_name(name: &str) -> Option<Sex> {
    let first = name.split_whitespace().next()?.to_lowercase();
    if MALE_FIRST_NAMES.contains(&first.as_str()) {
        Some(Sex::Male)
    } else if FEMALE_FIRST_NAMES.contains(&first.as_str()) {
        Some(Sex::Female)
    } else {
        None
    }
}

/// First introduction pattern that matches wins, even if its capture
/// turns out empty.
fn spoken_name(text: &str) -> Option<String> {
    let captured = NAME_RES
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|c| c.get(1))?;
    let name = GREETING_RE.replace(captured.as_str().trim(), "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn spoken_sex(text: &str) -> Option<Sex> {
    if MALE_RE.is_match(text) {
        Some(Sex::Male)
    } else if FEMALE_RE.is_match(text) {
        Some(Sex::Female)
    } else {
        None
    }
}

fn spoken_symptoms(text: &str) -> Vec<String> {
    let Some(listed) = SYMPTOMS_RE.captures(text).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    SYMPTOM_SPLIT_RE
        .split(listed.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_analysis_markdown ──────────────────────────────

    #[test]
    fn empty_analysis_has_every_section_dashed() {
        let md = format_analysis_markdown("");
        assert!(md.starts_with("1. **Summary:**\n-\n\n2. **Key Symptoms:**\n-"));
        assert!(md.ends_with("9. **Recommended Next Steps:**\n-"));
        assert_eq!(md.matches("\n-").count(), 9);
    }

    #[test]
    fn lines_are_routed_to_their_sections() {
        let analysis = "Here is the analysis.\n\
            ## Summary\n\
            Persistent dry cough.\n\
            ## Key Symptoms\n\
            - cough\n\
            - mild fever\n\
            ## Recommended next steps\n\
            See a GP.";
        let md = format_analysis_markdown(analysis);
        assert!(md.contains("1. **Summary:**\nPersistent dry cough.\n\n"));
        assert!(md.contains("2. **Key Symptoms:**\n- cough\n- mild fever\n\n"));
        assert!(md.ends_with("9. **Recommended Next Steps:**\nSee a GP."));
        assert!(!md.contains("Here is the analysis"));
    }

    #[test]
    fn doctor_summary_is_not_the_summary() {
        let md = format_analysis_markdown(
            "Summary: Cough for a week.\nDoctor-style clinical summary: Likely viral URTI.",
        );
        assert!(md.contains("1. **Summary:**\nCough for a week.\n\n"));
        assert!(md.contains("8. **Doctor Summary:**\nLikely viral URTI.\n\n"));
    }

    #[test]
    fn inline_content_after_bold_header_is_kept() {
        let md = format_analysis_markdown("- **Duration:** 3 days\n- **Severity:** moderate");
        assert!(md.contains("3. **Duration:**\n3 days\n\n"));
        assert!(md.contains("4. **Severity:**\nmoderate\n\n"));
    }

    #[test]
    fn fences_and_escaped_newlines_are_cleaned() {
        let md = format_analysis_markdown("```\\nSeverity\\nmild\\n```");
        assert!(md.contains("4. **Severity:**\nmild\n\n"));
        assert!(!md.contains("```"));
    }

    #[test]
    fn bare_list_markers_are_dropped() {
        let md = format_analysis_markdown("Possible causes\n3.\nViral infection");
        assert!(md.contains("5. **Possible Causes:**\nViral infection\n\n"));
    }

    // ── remove_large_gaps ─────────────────────────────────────

    #[test]
    fn gaps_collapse_to_one_blank_line() {
        assert_eq!(remove_large_gaps("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(remove_large_gaps("a  \n \n\t\n\nb"), "a\n\nb");
        assert_eq!(remove_large_gaps("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn layout_trims_the_result() {
        let md = layout_voice_analysis("\n\nSeverity:   severe   \n\n\n\n");
        assert!(md.starts_with("1. **Summary:**"));
        assert!(md.contains("4. **Severity:**\nsevere\n\n"));
        assert!(!md.ends_with('\n'));
    }

    // ── extract_patient_info ──────────────────────────────────

    #[test]
    fn full_introduction_is_extracted() {
        let info = extract_patient_info(
            "Hi, my name is Sarah Connor. I am a 34 year old. \
             I have a headache, nausea and dizziness. \
             It has been like this for 3 days. There is pain in my temples.",
        );
        assert_eq!(info.name.as_deref(), Some("Sarah Connor"));
        assert_eq!(info.age, Some(34));
        assert_eq!(info.sex, Some(Sex::Female));
        assert_eq!(info.symptoms, vec!["a headache", "nausea", "dizziness"]);
        assert_eq!(info.duration.as_deref(), Some("3 days"));
        assert_eq!(info.body_location.as_deref(), Some("my temples"));
    }

    #[test]
    fn stated_sex_overrides_name_guess() {
        let info = extract_patient_info("This is Sarah. Patient is male, 40-year-old.");
        assert_eq!(info.name.as_deref(), Some("Sarah"));
        assert_eq!(info.sex, Some(Sex::Male));
        assert_eq!(info.age, Some(40));
    }

    #[test]
    fn female_is_not_read_as_male() {
        let info = extract_patient_info("I'm a female patient");
        assert_eq!(info.sex, Some(Sex::Female));
    }

    #[test]
    fn and_inside_words_does_not_split_symptoms() {
        let info = extract_patient_info("I have a sandy rash and itching");
        assert_eq!(info.symptoms, vec!["a sandy rash", "itching"]);
    }

    #[test]
    fn plural_duration_keeps_unit() {
        let info = extract_patient_info("Swelling on my ankle for 2 weeks");
        assert_eq!(info.duration.as_deref(), Some("2 weeks"));
    }

    #[test]
    fn empty_transcript_has_no_details() {
        assert_eq!(extract_patient_info(""), PatientInfo::default());
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(extract_patient_info("This is John")).unwrap();
        assert_eq!(json["name"], "John");
        assert_eq!(json["sex"], "Male");
        assert!(json["age"].is_null());
        assert_eq!(json["symptoms"], serde_json::json!([]));
    }

    // ── guess_sex_from_name ───────────────────────────────────

    #[test]
    fn name_guess_uses_first_name_only() {
        assert_eq!(guess_sex_from_name("John Smith"), Some(Sex::Male));
        assert_eq!(guess_sex_from_name("maria lopez"), Some(Sex::Female));
    }

    #[test]
    fn unknown_or_unisex_names_are_none() {
        assert_eq!(guess_sex_from_name("Alex"), None);
        assert_eq!(guess_sex_from_name("Zyx"), None);
        assert_eq!(guess_sex_from_name("   "), None);
    }
}
