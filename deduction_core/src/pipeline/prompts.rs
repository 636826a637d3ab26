//! Prompt builders for each evaluation mode.
//!
//! Field names in the requested JSON are the wire contract with existing
//! prompts: `evaluation`/`explanation`, `is_correct`/`explanation`,
//! `matches: [{point, matched}]` and `similarity`/`reason`.

use case_rules::{ClueFact, StoryTruth, Verdict};

use super::RetrievedClue;

/// Verdict options offered to the model, one per line.
fn verdict_options() -> String {
    let mut options = String::new();
    for verdict in Verdict::MODEL_EMITTABLE {
        let meaning = match verdict {
            Verdict::CompletelyCorrect => "the statement is entirely correct.",
            Verdict::PartiallyCorrect => "the statement contains no error but is incomplete.",
            Verdict::Incorrect => "the statement contains an error or contradicts the facts.",
            Verdict::Noncommittal => "the known facts cannot decide whether it is right or wrong.",
            Verdict::Irrelevant => "the subject lies outside the facts, or it is not a yes/no statement.",
            Verdict::Unexpected => continue,
        };
        options.push_str(&format!("- {}: {}\n", verdict.label(), meaning));
    }
    options
}

fn verdict_format() -> String {
    let labels: Vec<_> = Verdict::MODEL_EMITTABLE.iter().map(|v| v.label()).collect();
    format!(
        "{{\n  \"evaluation\": \"({})\",\n  \"explanation\": \"(one short sentence, at most 20 words)\"\n}}",
        labels.join(" | ")
    )
}

/// Question about a single clue, judged against that clue's facts.
pub(crate) fn clue_question_prompt(story: &StoryTruth, clue: &ClueFact, question: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Role\n");
    prompt.push_str(
        "You are the Book of Answers in a detective game. Judge the player's question \
         as a true/false statement about the clue currently being inspected.\n\n",
    );

    prompt.push_str("# Rules\n");
    prompt.push_str(
        "1. Judge strictly against the clue's core facts. They are the primary basis for \
         CompletelyCorrect, PartiallyCorrect and Incorrect.\n",
    );
    prompt.push_str(
        "2. Use the story truth only to understand the question. If the question is about \
         something outside the clue's facts, answer Irrelevant even when it is true of the story.\n",
    );
    prompt.push_str(
        "3. Open questions that need narration or interpretation (\"why did this happen?\", \
         \"what happened next?\") are Irrelevant.\n",
    );
    prompt.push_str(
        "4. Your evaluation and explanation must agree. Reply with a single JSON object only.\n\n",
    );

    prompt.push_str("## Story truth (global reference)\n");
    prompt.push_str(&story.full_solution);
    prompt.push_str("\n\n");

    prompt.push_str(&format!("## Clue: {}\n", clue.display_name));
    prompt.push_str("### A. Core facts (primary basis for your judgment)\n");
    prompt.push_str(&clue.facts_for_model);
    prompt.push('\n');
    if !clue.description_for_player.is_empty() {
        prompt.push_str("### B. What the player sees (context only)\n");
        prompt.push_str(&clue.description_for_player);
        prompt.push('\n');
    }
    prompt.push('\n');

    prompt.push_str("## Player's question\n");
    prompt.push_str(&format!("\"{}\"\n\n", question));

    prompt.push_str("## Options\n");
    prompt.push_str(&verdict_options());
    prompt.push('\n');

    prompt.push_str("## Your evaluation (strictly this JSON format)\n");
    prompt.push_str(&verdict_format());
    prompt
}

/// Statement judged against several retrieved clues, most similar first.
pub(crate) fn global_statement_prompt(
    story: &StoryTruth,
    retrieved: &[RetrievedClue],
    statement: &str,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Role\n");
    prompt.push_str(
        "You are the Book of Answers in a detective game. Judge the player's statement as \
         true or false using the story truth and the discovered clues below, which were \
         selected as the most relevant to the statement.\n\n",
    );

    prompt.push_str("## Story truth\n");
    prompt.push_str(&story.full_solution);
    prompt.push_str("\n\n");

    prompt.push_str("## Relevant clues\n");
    for (i, item) in retrieved.iter().enumerate() {
        prompt.push_str(&format!(
            "### Clue {}: {}\n{}\n",
            i + 1,
            item.clue.display_name,
            item.clue.facts_for_model
        ));
    }
    prompt.push('\n');

    prompt.push_str("## Player's statement\n");
    prompt.push_str(&format!("\"{}\"\n\n", statement));

    prompt.push_str("## Options\n");
    prompt.push_str(&verdict_options());
    prompt.push('\n');

    prompt.push_str("## Your evaluation (a single JSON object, no markdown)\n");
    prompt.push_str(&verdict_format());
    prompt
}

/// Quiz answer judged against a success criterion.
pub(crate) fn quiz_judge_prompt(question: &str, answer: &str, criterion: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a game referee. Decide whether the player's answer semantically answers \
         the question and agrees with the success criterion.\n\n",
    );
    prompt.push_str(&format!("## Question\n{}\n\n", question));
    prompt.push_str(&format!("## Success criterion\n{}\n\n", criterion));
    prompt.push_str(&format!("## Player's answer\n{}\n\n", answer));

    prompt.push_str("## Output\n");
    prompt.push_str(
        "Be strict and prefer a clear judgment. Reply with a single JSON object:\n\
         {\"is_correct\": true/false, \"explanation\": \"one sentence\"}\n\
         Only if the answer is genuinely ambiguous or off-topic, reply instead with\n\
         {\"evaluation\": \"(PartiallyCorrect | Noncommittal | Irrelevant)\", \"explanation\": \"one sentence\"}\n",
    );
    prompt
}

/// Final statement scored against the checklist.
pub(crate) fn final_verdict_prompt(scoring_points: &[String], statement: &str) -> String {
    // serde_json escapes quotes inside points
    let points = serde_json::to_string(scoring_points).unwrap_or_else(|_| "[]".to_string());

    let mut prompt = String::new();
    prompt.push_str(
        "You are a game referee. Read the player's final statement carefully and decide, \
         for every item of the scoring list, whether the statement clearly covers it.\n\n",
    );
    prompt.push_str(&format!("## Scoring list\n{}\n\n", points));
    prompt.push_str(&format!("## Player's final statement\n{}\n\n", statement));
    prompt.push_str("## Output\n");
    prompt.push_str(
        "Reply with a single JSON object with one entry per scoring item, copying each item verbatim:\n\
         {\"matches\": [{\"point\": \"scoring item\", \"matched\": true/false}, ...]}\n",
    );
    prompt
}

/// Player theory compared with the full solution.
pub(crate) fn final_theory_prompt(story: &StoryTruth, theory: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are a game referee. Compare the player's theory with the true story and rate \
         how closely the theory captures what really happened.\n\n",
    );
    prompt.push_str(&format!("## True story\n{}\n\n", story.full_solution));
    prompt.push_str(&format!("## Player's theory\n{}\n\n", theory));
    prompt.push_str("## Output\n");
    prompt.push_str(
        "Reply with a single JSON object, where similarity is between 0.0 and 1.0:\n\
         {\"similarity\": 0.0, \"reason\": \"one sentence\"}\n",
    );
    prompt
}
