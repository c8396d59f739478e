//! Benchmarks for the settle path.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use notesync::editor::ChangeKind;
use notesync::note::Note;
use notesync::replay::{self, Script, ScriptEvent, TimedEvent};
use notesync::signal::EditorStats;
use notesync::sync::{Message, SyncConfig, SyncModel, update};

fn bench_keystroke_burst(c: &mut Criterion) {
    c.bench_function("keystroke_burst", |b| {
        b.iter(|| {
            let mut model = SyncModel::new(&SyncConfig::default());
            model.mounted = true;
            for now_ms in 0..500 {
                let msg = Message::RawChange {
                    kind: ChangeKind::Keystroke,
                    now_ms: black_box(now_ms),
                };
                model = update(model, msg).0;
            }
            model
        });
    });
}

fn bench_stats(c: &mut Criterion) {
    let markup = "<p>The quick brown fox &amp; friends</p>".repeat(200);
    c.bench_function("editor_stats", |b| {
        b.iter(|| EditorStats::from_markup(black_box(&markup)));
    });
}

fn bench_inbound_push(c: &mut Criterion) {
    let content = "<p>remote</p>".repeat(100);
    c.bench_function("inbound_push", |b| {
        b.iter(|| {
            let mut model = SyncModel::new(&SyncConfig::default());
            model.mounted = true;
            let msg = Message::NoteChanged {
                note: Note::persisted("n1", content.clone()),
                shown: String::new(),
            };
            update(model, black_box(msg))
        });
    });
}

fn bench_replay_session(c: &mut Criterion) {
    let events = (0..200)
        .map(|i| TimedEvent {
            at: i * 30,
            event: ScriptEvent::Type {
                text: "word ".to_string(),
            },
        })
        .collect();
    let script = Script {
        events,
        ..Script::default()
    };
    c.bench_function("replay_session", |b| {
        b.iter(|| replay::run_script(black_box(&script), &SyncConfig::default()));
    });
}

criterion_group!(
    benches,
    bench_keystroke_burst,
    bench_stats,
    bench_inbound_push,
    bench_replay_session
);
criterion_main!(benches);
