//! Canned-response site assistant behind `/api/chatbot`.
//!
//! Messages are scored against a fixed set of topics by keyword. The two best
//! topics answer; with no match a generic pointer to the site comes back.

use std::collections::HashSet;

use serde::Serialize;

const MAX_TOPICS: usize = 2;
const MAX_SUGGESTIONS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "from", "with", "that", "this", "into", "about", "have", "your", "you",
    "our", "what", "when", "where", "how", "can", "are", "is", "does", "they", "them", "there",
    "please", "tell", "more", "need",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub answer: String,
    pub suggestions: Vec<Suggestion>,
    pub matched_topics: Vec<String>,
}

struct Topic {
    id: &'static str,
    keywords: &'static [&'static str],
    answer: &'static str,
    suggestions: &'static [(&'static str, &'static str)],
}

const TOPICS: &[Topic] = &[
    Topic {
        id: "pricing",
        keywords: &[
            "price", "pricing", "plan", "plans", "cost", "tier", "starter", "professional",
            "enterprise", "subscription", "checkout", "billing",
        ],
        answer: "Public pricing is currently not listed. Request a demo and the team will recommend the right package based on your workflow, integration needs, and team size.",
        suggestions: &[
            ("Request demo", "/#contact"),
            ("Talk to sales", "/#contact"),
            ("Contact team", "/#contact"),
        ],
    },
    Topic {
        id: "product",
        keywords: &[
            "feature", "features", "platform", "tool", "research", "analytics", "alerts",
            "backtest", "algorithm", "trading", "signal",
        ],
        answer: "Core platform capabilities include Real-Time Analytics, AI-Powered Insights, Multi-Market Coverage, System Architecture. The product is focused on market research and decision support across futures, options, and forex workflows.",
        suggestions: &[
            ("See feature section", "/#features"),
            ("View product tour", "/#tour"),
            ("Open solutions", "/#solutions"),
        ],
    },
    Topic {
        id: "api",
        keywords: &[
            "api", "integration", "integrate", "endpoint", "data", "feed", "webhook", "keys",
            "dashboard", "developer",
        ],
        answer: "API access is included from the Professional tier upward, with higher throughput and custom integration support in Enterprise. You can manage API keys from the dashboard and use the platform for data-driven workflows.",
        suggestions: &[
            ("API keys page", "/dashboard/api-keys"),
            ("Request demo", "/#contact"),
            ("Contact integrations team", "/#contact"),
        ],
    },
    Topic {
        id: "security",
        keywords: &[
            "security", "secure", "infrastructure", "stripe", "compliance", "privacy", "latency",
            "uptime", "reliable",
        ],
        answer: "The stack is built on trusted infrastructure: Next.js, PostgreSQL, Prisma, Stripe, and Resend. Billing runs through Stripe, and the platform is designed for reliability with low-latency market data workflows.",
        suggestions: &[
            ("Security disclaimer", "/disclaimer"),
            ("Privacy policy", "/privacy"),
            ("View tech section", "/#technology"),
        ],
    },
    Topic {
        id: "support",
        keywords: &[
            "support", "contact", "email", "help", "team", "sales", "demo", "talk", "reach",
            "company",
        ],
        answer: "You can reach the Optiveon team from the contact section or directly via info@optiveon.com. Company location: 5900 Balcones Drive, Suite 100, Austin, TX 78731.",
        suggestions: &[
            ("Open contact section", "/#contact"),
            ("Send email", "mailto:info@optiveon.com"),
            ("Request demo", "/#contact"),
        ],
    },
    Topic {
        id: "legal",
        keywords: &[
            "legal", "terms", "privacy", "risk", "advice", "regulated", "policy", "disclaimer",
            "compliant",
        ],
        answer: "Optiveon provides technology and research tools and does not provide investment advice. For legal details, use the Terms, Privacy, and Risk Disclaimer pages linked in the footer and policy section.",
        suggestions: &[
            ("Terms of service", "/terms"),
            ("Privacy policy", "/privacy"),
            ("Risk disclaimer", "/disclaimer"),
        ],
    },
];

fn suggestions(pairs: &[(&str, &str)]) -> Vec<Suggestion> {
    pairs
        .iter()
        .map(|(label, href)| Suggestion {
            label: (*label).to_owned(),
            href: (*href).to_owned(),
        })
        .collect()
}

fn tokenize(question: &str) -> Vec<String> {
    let cleaned: String = question
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.len() > 1 && !STOP_WORDS.contains(token))
        .map(str::to_owned)
        .collect()
}

// Substring hit: +2, whole-token hit: +1
fn score(question: &str, tokens: &[String], topic: &Topic) -> u32 {
    topic.keywords.iter().fold(0, |score, keyword| {
        if question.contains(keyword) {
            score + 2
        } else if tokens.iter().any(|token| token == keyword) {
            score + 1
        } else {
            score
        }
    })
}

pub fn reply(message: &str) -> AssistantReply {
    let question = message.trim().to_lowercase();

    if question.is_empty() {
        return AssistantReply {
            answer: "Ask me about demos, onboarding, product features, API access, support, or legal policy pages.".to_owned(),
            suggestions: suggestions(&[
                ("Request demo", "/#contact"),
                ("Features", "/#features"),
                ("Contact", "/#contact"),
            ]),
            matched_topics: Vec::new(),
        };
    }

    let tokens = tokenize(&question);

    let mut ranked: Vec<(&Topic, u32)> = TOPICS
        .iter()
        .map(|topic| (topic, score(&question, &tokens, topic)))
        .filter(|(_, score)| *score > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    if ranked.is_empty() {
        return AssistantReply {
            answer: "I can answer questions about Optiveon demos, product capabilities, API access, support contacts, and legal pages. If you share your goal, I can point you to the exact page and next step.".to_owned(),
            suggestions: suggestions(&[
                ("Request demo", "/#contact"),
                ("View features", "/#features"),
                ("Talk to team", "/#contact"),
            ]),
            matched_topics: Vec::new(),
        };
    }

    let selected = &ranked[..ranked.len().min(MAX_TOPICS)];

    let answer = selected
        .iter()
        .map(|(topic, _)| topic.answer)
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut seen = HashSet::new();
    let suggestions = selected
        .iter()
        .flat_map(|(topic, _)| suggestions(topic.suggestions))
        .filter(|suggestion| seen.insert(format!("{}:{}", suggestion.label, suggestion.href)))
        .take(MAX_SUGGESTIONS)
        .collect();

    AssistantReply {
        answer,
        suggestions,
        matched_topics: selected.iter().map(|(topic, _)| topic.id.to_owned()).collect(),
    }
}
