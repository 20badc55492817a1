//! In-process engine harness

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use tabtree::config::EngineConfig;
use tabtree::domain::ports::{IssuedCommand, ManualClock, RecordingHost};
use tabtree::{CommandResult, NodeId, TabCommand, TabEvent, TabId, TabTreeEngine, WindowId};

pub const W1: WindowId = WindowId::new(1);
pub const W2: WindowId = WindowId::new(2);

pub fn start() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

pub fn created(tab: u32, window: WindowId, index: usize, opener: Option<u32>, title: &str) -> TabEvent {
    TabEvent::TabCreated {
        tab: TabId::new(tab),
        window,
        index,
        opener: opener.map(TabId::new),
        title: Some(title.to_string()),
        url: Some(format!("https://example.org/{tab}")),
        pinned: None,
        active: None,
    }
}

pub struct Session {
    pub engine: TabTreeEngine,
    pub host: RecordingHost,
    pub clock: ManualClock,
    next_host_tab: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let host = RecordingHost::new();
        let clock = ManualClock::starting_at(start());
        let mut engine =
            TabTreeEngine::new(config, Arc::new(host.clone()), Arc::new(clock.clone()));
        engine
            .apply_event(&TabEvent::WindowCreated { window: W1 })
            .unwrap();
        Self {
            engine,
            host,
            clock,
            next_host_tab: 1000,
        }
    }

    /// Open a tab at the end of window 1's strip
    pub fn open(&mut self, tab: u32, opener: Option<u32>, title: &str) -> NodeId {
        let index = self.engine.store().nodes_in_window(W1).count();
        self.engine
            .apply_event(&created(tab, W1, index, opener, title))
            .unwrap();
        self.node(tab)
    }

    pub fn node(&self, tab: u32) -> NodeId {
        self.engine
            .store()
            .node_for_tab(TabId::new(tab))
            .unwrap_or_else(|| panic!("tab {tab} is not bound"))
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.engine.store().get(node).unwrap().children().to_vec()
    }

    pub fn title(&self, node: NodeId) -> String {
        self.engine.store().get(node).unwrap().title().to_string()
    }

    /// Commands issued since the last call
    pub fn drain(&self) -> Vec<IssuedCommand> {
        self.host.drain()
    }

    /// Answer every `CreateTab` in `issued` with success and a fresh tab id.
    ///
    /// Returns the tab ids in command order.
    pub fn complete_creates(&mut self, issued: &[IssuedCommand]) -> Vec<TabId> {
        let mut tabs = Vec::new();
        for entry in issued {
            if let TabCommand::CreateTab { .. } = entry.command {
                self.next_host_tab += 1;
                let tab = TabId::new(self.next_host_tab);
                self.engine
                    .on_command_result(&CommandResult::Succeeded {
                        command: entry.id,
                        tab: Some(tab),
                    })
                    .unwrap();
                tabs.push(tab);
            }
        }
        tabs
    }
}
