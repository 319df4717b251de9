use chrono::{DateTime, Utc};
use tutor_core::model::{Difficulty, WebQuestion};

struct Entry {
    id: &'static str,
    title: &'static str,
    question: &'static str,
    source: &'static str,
    source_type: &'static str,
    difficulty: Difficulty,
    tags: &'static [&'static str],
    solution: Option<&'static str>,
    code_snippet: Option<&'static str>,
    upvotes: Option<u32>,
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: "web-actor-reentrancy",
        title: "Actor state changes across an await",
        question: "Inside an actor method I read a property, await a network call, then write the property back. Another call's write gets lost. Isn't the actor supposed to serialize access?",
        source: "https://forums.swift.org/c/swift-users",
        source_type: "swift-forums",
        difficulty: Difficulty::Expert,
        tags: &["concurrency", "actors", "reentrancy"],
        solution: Some("Actors are reentrant: every await is a suspension point where other calls may run. Re-read state after the await, or do the check-and-write without suspending in between."),
        code_snippet: Some("actor Cache {\n    var value = 0\n    func bump() async {\n        let current = value\n        await slowWork()\n        value = current + 1 // may overwrite another bump\n    }\n}"),
        upvotes: Some(214),
    },
    Entry {
        id: "web-weak-self-task",
        title: "Do I need [weak self] in Task { }?",
        question: "Is a Task closure that captures self strongly a retain cycle, the same way an escaping completion handler stored on self would be?",
        source: "https://stackoverflow.com/questions/tagged/swift-concurrency",
        source_type: "stackoverflow",
        difficulty: Difficulty::Hard,
        tags: &["memory", "closures", "concurrency"],
        solution: Some("A Task releases its closure when it finishes, so a strong capture only extends self's lifetime until then. It becomes a leak only when the task never ends, e.g. an infinite for-await loop."),
        code_snippet: Some("Task {\n    for await update in stream {\n        self.apply(update) // keeps self alive while the stream is open\n    }\n}"),
        upvotes: Some(388),
    },
    Entry {
        id: "web-mainactor-sendable",
        title: "Sending a non-Sendable model to the main actor",
        question: "After enabling strict concurrency, passing my view model into a detached task produces 'capture of non-sendable type'. What is the right fix?",
        source: "https://www.reddit.com/r/swift",
        source_type: "reddit",
        difficulty: Difficulty::Hard,
        tags: &["swift6", "sendable", "mainactor"],
        solution: Some("Isolate the model to @MainActor and hop with await instead of sharing it across tasks, or pass only Sendable value snapshots into the task."),
        code_snippet: None,
        upvotes: Some(97),
    },
    Entry {
        id: "web-sync-deadlock",
        title: "DispatchQueue.main.sync from the main thread",
        question: "Why does calling DispatchQueue.main.sync inside a button handler freeze the app?",
        source: "Stack Overflow",
        source_type: "stackoverflow",
        difficulty: Difficulty::Medium,
        tags: &["dispatchqueue", "threading"],
        solution: Some("sync waits for the block to run on the target queue. The main queue is busy running the caller, so the block never starts: a deadlock."),
        code_snippet: Some("DispatchQueue.main.sync {\n    label.text = \"done\"\n}"),
        upvotes: Some(1_024),
    },
    Entry {
        id: "web-observable-state",
        title: "@StateObject with an @Observable class",
        question: "My @Observable view model is recreated on every parent render. I declared it with @StateObject like before. What changed?",
        source: "https://forums.swift.org/c/swiftui",
        source_type: "swift-forums",
        difficulty: Difficulty::Medium,
        tags: &["observation", "swiftui", "migration"],
        solution: Some("@Observable types are owned with @State, not @StateObject. @State keeps one instance for the view's lifetime."),
        code_snippet: Some("@State private var model = LibraryModel()"),
        upvotes: None,
    },
];

/// The curated community questions, stamped as fetched at `fetched_at`.
pub(crate) fn curated_questions(fetched_at: DateTime<Utc>) -> Vec<WebQuestion> {
    ENTRIES
        .iter()
        .map(|entry| WebQuestion {
            id: entry.id.to_owned(),
            title: entry.title.to_owned(),
            question: entry.question.to_owned(),
            source: entry.source.to_owned(),
            source_type: entry.source_type.to_owned(),
            difficulty: entry.difficulty,
            tags: entry.tags.iter().map(|t| (*t).to_owned()).collect(),
            solution: entry.solution.map(str::to_owned),
            code_snippet: entry.code_snippet.map(str::to_owned),
            fetched_date: fetched_at,
            upvotes: entry.upvotes,
        })
        .collect()
}
