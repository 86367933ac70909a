//! Keyword skill extraction: catalogue entries found as case-insensitive
//! substrings of the résumé text. No parsing beyond that.

const SKILL_CATALOGUE: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "React",
    "Node.js",
    "Python",
    "Java",
    "C++",
    "SQL",
    "MongoDB",
    "PostgreSQL",
    "AWS",
    "Azure",
    "Docker",
    "Kubernetes",
    "Git",
    "Agile",
    "Scrum",
    "REST API",
    "GraphQL",
    "HTML",
    "CSS",
    "Angular",
    "Vue.js",
    "Express",
    "Django",
    "Flask",
    "Spring Boot",
    "Machine Learning",
    "Data Analysis",
    "DevOps",
    "CI/CD",
    "Jenkins",
    "TensorFlow",
    "PyTorch",
    "Pandas",
    "NumPy",
    "Leadership",
    "Communication",
    "Problem Solving",
    "Team Management",
    "Project Management",
    "Excel",
];

/// Returns matching catalogue entries in catalogue order.
pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SKILL_CATALOGUE
        .iter()
        .filter(|skill| lower.contains(&skill.to_lowercase()))
        .map(|skill| skill.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_skills_case_insensitively() {
        let skills = extract_skills("Built services in python and deployed with DOCKER.");
        assert_eq!(skills, vec!["Python", "Docker"]);
    }

    #[test]
    fn test_substring_matching_is_literal() {
        // "JavaScript" contains "Java"; both are reported.
        let skills = extract_skills("Senior JavaScript engineer");
        assert_eq!(skills, vec!["JavaScript", "Java"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(extract_skills("").is_empty());
        assert!(extract_skills("Gardening and cooking").is_empty());
    }
}
