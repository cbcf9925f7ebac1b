#![cfg(feature = "in-memory")]

use prompts::prelude::*;
use uuid::Uuid;

#[tokio::test]
async fn prelude_exposes_store_and_media_helpers() {
    let store = MemPromptStore::new();
    let prompt = store
        .create_prompt(NewPrompt::new("Rewrite politely").with_image("/uploads/polite.png"))
        .await
        .unwrap();

    store
        .record_copy(prompt.id, CopyActor::User(Uuid::new_v4()))
        .await
        .unwrap();
    store.record_copy(prompt.id, CopyActor::Anonymous).await.unwrap();
    let prompt = store.record_vote(prompt.id, Uuid::new_v4()).await.unwrap();

    assert_eq!(prompt.total_copies, 2);
    assert_eq!(prompt.likes, 1);

    let urls = MediaUrls::new(MediaConfig::new("https://r1.example.com").unwrap());
    assert_eq!(
        urls.prompt_image_url(prompt.image_path.as_deref()),
        "https://r1.example.com/uploads/polite.png"
    );
    assert_eq!(
        urls.avatar_url(None),
        "https://r1.example.com/default-avatar.png"
    );
}
