//! Canned answers for the chat endpoint, keyed on the questions the hosted
//! assistant is instructed to handle.

struct Rule {
    triggers: &'static [&'static str],
    answer: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        triggers: &["how do i use", "where do i start", "where do i type"],
        answer: "To use the tool, open the 'Genre Classification' page, paste your plot summary \
                 into the 'Enter Movie Synopsis' box and click 'Analyze Genre'.",
    },
    Rule {
        triggers: &["don't have a plot", "dont have a plot", "example"],
        answer: "Yes! The 'Try These Example Plots' section offers Sci-Fi, Romance and Thriller \
                 plots that fill the text area for you.",
    },
    Rule {
        triggers: &["after i click", "loading", "what happens"],
        answer: "The system goes through 3 steps: 1. Tokenization (cleaning text), 2. Feature \
                 Extraction (TF-IDF), and 3. Classification (SVM prediction).",
    },
    Rule {
        triggers: &["how fast", "how many movies", "accuracy"],
        answer: "The model was trained on 9000+ movies and predicts in under 3 seconds. The ~40% \
                 accuracy reflects how subjective and overlapping movie genres are.",
    },
    Rule {
        triggers: &["tech stack", "algorithm", "svm"],
        answer: "We use Linear SVM and TF-IDF for classification, with a Flask backend and a \
                 React frontend. See the 'Technical Stack' tab on the About page for details.",
    },
    Rule {
        triggers: &["why did you build", "objective", "business"],
        answer: "Our goal is to automate metadata tagging for streaming services. The About \
                 page covers the objectives and commercial potential.",
    },
    Rule {
        triggers: &["home page"],
        answer: "The Home page provides the project dashboard, key statistics and a quick \
                 'How It Works' guide.",
    },
    Rule {
        triggers: &["who made", "team"],
        answer: "This project was developed by Group DEY: Ding Jia Jun, Eldhon Chong Qi Jie and \
                 Tan Yi Xin.",
    },
];

pub const FALLBACK_ANSWER: &str = "I'm the Cinematch assistant. Ask me how to classify a plot, \
                                   about the tech stack, or about the team behind the project.";

pub fn answer(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.triggers.iter().any(|trigger| lower.contains(trigger)))
        .map_or(FALLBACK_ANSWER, |rule| rule.answer)
}
