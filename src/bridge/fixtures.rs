use crate::webhooks::github::PushEvent;

/// Push of two commits: the first references bug 123456, the second bugs 123456 and 999999.
pub(crate) fn push_event(r#ref: &str) -> PushEvent {
    let payload = serde_json::json!({
        "ref": r#ref,
        "repository": {
            "html_url": "https://github.com/Codertocat"
        },
        "commits": [
            {
                "id": "d3faddfaddb9eac64f00a09df73cbb783c6ad855",
                "distinct": true,
                "message": "First commit bug 123456",
                "timestamp": "2015-10-23T13:18:47+03:00",
                "url": "https://github.com/atodorov/bztest/commit/d3faddfaddb9eac64f00a09df73cbb783c6ad855",
                "author": {
                    "name": "Alexander Todorov",
                    "email": "atodorov@redhat.com",
                    "username": "atodorov"
                },
                "modified": ["README"]
            },
            {
                "id": "8ee2da3e225008f17bc89439f72bd6652111942a",
                "distinct": true,
                "message": "2nd commit issue 123456\n\nResolves: 999999",
                "timestamp": "2015-10-23T13:19:13+03:00",
                "url": "https://github.com/atodorov/bztest/commit/8ee2da3e225008f17bc89439f72bd6652111942a",
                "author": {
                    "name": "Alexander Todorov",
                    "email": "atodorov@redhat.com",
                    "username": "atodorov"
                },
                "modified": ["README"]
            }
        ]
    });

    serde_json::from_value(payload).unwrap()
}

/// Push of a single commit.
pub(crate) fn single_commit_push(r#ref: &str, id: &str, message: &str) -> PushEvent {
    let payload = serde_json::json!({
        "ref": r#ref,
        "repository": {
            "html_url": "https://github.com/Codertocat"
        },
        "commits": [{
            "id": id,
            "url": format!("https://github.com/atodorov/bztest/commit/{}", id),
            "message": message,
            "timestamp": "2015-10-23T13:18:47+03:00"
        }]
    });

    serde_json::from_value(payload).unwrap()
}
