//! Intent routing
//!
//! Classification is plain case-insensitive substring containment over an
//! ordered rule table. The first rule with a matching trigger wins; anything
//! that matches no rule is echoed back.

use super::{DEFAULT_RATE, DEFAULT_VOLUME, Intent, ResponseDirective, Utterance};

/// A trigger list and the intent it selects
struct Rule {
    triggers: &'static [&'static str],
    intent: Intent,
}

/// Rules in priority order. Triggers are lowercase.
const RULES: &[Rule] = &[
    Rule {
        triggers: &["goodbye", "quit"],
        intent: Intent::Terminate,
    },
    Rule {
        triggers: &["hello"],
        intent: Intent::Greeting,
    },
    Rule {
        triggers: &["what is your name"],
        intent: Intent::IdentityQuery,
    },
    Rule {
        triggers: &["be my boyfriend"],
        intent: Intent::HostileSolicitation,
    },
];

/// Classify an utterance
///
/// Total: every input maps to some intent, with [`Intent::Echo`] as the fallback.
#[must_use]
pub fn classify(utterance: &Utterance) -> Intent {
    let normalized = utterance.text().to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.triggers.iter().any(|t| normalized.contains(t)))
        .map_or_else(
            || Intent::Echo(utterance.text().to_string()),
            |rule| rule.intent.clone(),
        )
}

/// Render the spoken response for an intent
#[must_use]
pub fn render(intent: &Intent) -> ResponseDirective {
    match intent {
        Intent::Terminate => ResponseDirective::new("Goodbye!", 130, 0.9),
        Intent::Greeting => ResponseDirective::plain("Hello! How can I help you?"),
        Intent::IdentityQuery => ResponseDirective::plain("I am your assistant."),
        Intent::HostileSolicitation => ResponseDirective::new(
            "No thanks. You already have a very handsome boyfriend.",
            DEFAULT_RATE,
            DEFAULT_VOLUME,
        ),
        Intent::Echo(text) => ResponseDirective::plain(format!("You said: {text}")),
    }
}

/// Stateless router pairing [`classify`] and [`render`]
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentRouter;

impl IntentRouter {
    /// Classify an utterance and render its directive in one step
    #[must_use]
    pub fn route(self, utterance: &Utterance) -> (Intent, ResponseDirective) {
        let intent = classify(utterance);
        let directive = render(&intent);
        tracing::debug!(?intent, reply = %directive.text, "utterance routed");
        (intent, directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utter(text: &str) -> Utterance {
        Utterance::new(text, "en-US")
    }

    #[test]
    fn test_termination_keywords_anywhere() {
        for text in ["goodbye", "OK GoodBye then", "I want to QUIT", "quitting time"] {
            assert_eq!(classify(&utter(text)), Intent::Terminate, "{text}");
        }
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(classify(&utter("hello and goodbye")), Intent::Terminate);
        assert_eq!(
            classify(&utter("hello, what is your name")),
            Intent::Greeting
        );
        assert_eq!(
            classify(&utter("what is your name, will you be my boyfriend")),
            Intent::IdentityQuery
        );
    }

    #[test]
    fn test_hostile_solicitation() {
        assert_eq!(
            classify(&utter("Will you Be My Boyfriend?")),
            Intent::HostileSolicitation
        );
    }

    #[test]
    fn test_echo_keeps_original_text() {
        let intent = classify(&utter("The Weather Is NICE"));
        assert_eq!(intent, Intent::Echo("The Weather Is NICE".to_string()));
        assert_eq!(render(&intent).text, "You said: The Weather Is NICE");
    }

    #[test]
    fn test_no_fuzzy_matching() {
        // "helo" is not "hello"
        assert_eq!(classify(&utter("helo")), Intent::Echo("helo".to_string()));
        assert_eq!(
            classify(&utter("what's your name")),
            Intent::Echo("what's your name".to_string())
        );
    }

    #[test]
    fn test_render_terminate() {
        let directive = render(&Intent::Terminate);
        assert_eq!(directive.text, "Goodbye!");
        assert_eq!(directive.rate, 130);
        assert!((directive.volume - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let u = utter("Hello there");
        assert_eq!(classify(&u), classify(&u));
    }

    #[test]
    fn test_route_greeting() {
        let (intent, directive) = IntentRouter.route(&utter("Hello there"));
        assert_eq!(intent, Intent::Greeting);
        assert_eq!(
            directive,
            ResponseDirective::new("Hello! How can I help you?", 150, 1.0)
        );
    }
}
