//! Unit tests for the GitHub comment module.


use rstest::rstest;

use super::{CommentError, IssueComment, PersonalAccessToken, PullRequestNumber};

#[rstest]
fn rejects_empty_token() {
    let result = PersonalAccessToken::new(String::new());
    assert!(
        matches!(result, Err(CommentError::MissingToken)),
        "expected MissingToken, got {result:?}"
    );
}

#[rstest]
fn trims_token_and_hides_it_from_debug() {
    let token = PersonalAccessToken::new("  ghp_secret \n").expect("token should be accepted");
    assert_eq!(token.value(), "ghp_secret", "token should be trimmed");
    assert_eq!(format!("{token:?}"), "PersonalAccessToken(***)");
}

#[rstest]
#[case::zero(0, false)]
#[case::one(1, true)]
#[case::large(98_765, true)]
fn pull_request_number_rejects_zero(#[case] value: u64, #[case] accepted: bool) {
    let result = PullRequestNumber::new(value);
    assert_eq!(result.is_ok(), accepted, "unexpected outcome for {value}");
    if !accepted {
        assert_eq!(result, Err(CommentError::InvalidPullRequestNumber));
    }
}

#[rstest]
#[case::marker_present(Some("<!-- pr-error-logger -->\nbody"), true)]
#[case::marker_after_whitespace(Some("\n <!-- pr-error-logger -->\nbody"), true)]
#[case::marker_quoted_in_reply(Some("> <!-- pr-error-logger -->\nwhy is this here?"), false)]
#[case::marker_mid_body(Some("see the bot comment <!-- pr-error-logger -->"), false)]
#[case::marker_absent(Some("LGTM"), false)]
#[case::no_body(None, false)]
fn detects_marker_in_comment_body(#[case] body: Option<&str>, #[case] expected: bool) {
    let comment = IssueComment {
        id: 1,
        body: body.map(str::to_owned),
        author: None,
    };
    assert_eq!(comment.carries_marker("<!-- pr-error-logger -->"), expected);
}
