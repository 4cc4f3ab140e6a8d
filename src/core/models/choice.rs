use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Choice {
    pub id: i32,
    pub question_id: i32,
    pub choice_text: String,
    pub votes: i32,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub question_id: i32,
    pub choice_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceResult {
    pub choice: Choice,
    pub votes: i32,
    pub percent: f64,
}

/// Share of `votes` in `total` as a percentage with one decimal, 0 when
/// nobody has voted yet.
/// Share of `total`, rounded to one decimal with ties going to the even digit.
pub fn percent(votes: i32, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let share = votes as f64 / total as f64 * 100.0;
    (share * 10.0).round_ties_even() / 10.0
}

pub fn tally(choices: Vec<Choice>) -> (Vec<ChoiceResult>, i64) {
    let total: i64 = choices.iter().map(|c| c.votes as i64).sum();
    let results = choices
        .into_iter()
        .map(|choice| ChoiceResult {
            votes: choice.votes,
            percent: percent(choice.votes, total),
            choice,
        })
        .collect();
    (results, total)
}
