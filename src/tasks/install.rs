//! Install task: run builds, then place every matching config entry.
use anyhow::{Result, bail};

use super::processing::{place_entry, run_commands};
use super::{Context, Task, TaskResult, TaskStats};
use crate::config::Component;
use crate::config::builds::{BUILDS_DIR, get_builds};

/// Build and place one component: run its build commands, then place every
/// config entry that applies to the current machine.
#[derive(Debug)]
pub struct InstallComponent {
    component: Component,
}

impl InstallComponent {
    /// Create the install task for `component`.
    #[must_use]
    pub const fn new(component: Component) -> Self {
        Self { component }
    }

    fn run_builds(&self, ctx: &Context) -> Result<()> {
        let commands = get_builds(ctx.machine(), &self.component, &*ctx.fs_ops)?;
        run_commands(ctx, &self.component.dir, &commands)
    }
}

impl Task for InstallComponent {
    fn name(&self) -> &str {
        self.component.name()
    }

    fn should_run(&self, ctx: &Context) -> bool {
        let machine = ctx.machine();
        let manifest = &self.component.manifest;
        manifest.configs.iter().any(|e| e.applies_to(machine))
            || manifest.builds.keys().any(|tag| tag.applies_to(machine))
            || ctx.fs_ops.exists(&self.component.dir.join(BUILDS_DIR))
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut failures = 0u32;

        if let Err(e) = self.run_builds(ctx) {
            ctx.log.error(&format!("build failed: {e:#}"));
            failures += 1;
        }

        let machine = ctx.machine();
        let mut stats = TaskStats::new();
        for entry in self
            .component
            .manifest
            .configs
            .iter()
            .filter(|e| e.applies_to(machine))
        {
            match place_entry(ctx, &self.component, entry) {
                Ok(delta) => stats += delta,
                Err(e) => {
                    ctx.log.error(&format!("{}: {e:#}", entry.from));
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            ctx.log.info(&stats.summary(ctx.dry_run));
            bail!("{failures} step(s) failed");
        }
        Ok(stats.finish(ctx))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::resolver::resolve;
    use crate::logging::Outcome;
    use crate::operations::SystemFileSystemOps;
    use crate::platform::MachineId;
    use crate::tasks::execute;
    use crate::tasks::test_helpers::{RecordingExecutor, RecordingLog, home_env, make_context};
    use std::path::Path;
    use std::sync::Arc;

    struct Fixture {
        root: tempfile::TempDir,
        home: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                root: tempfile::tempdir().unwrap(),
                home: tempfile::tempdir().unwrap(),
            }
        }

        fn component(&self, name: &str, manifest: &str, files: &[(&str, &str)]) -> Component {
            let dir = self.root.path().join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("manifest.toml"), manifest).unwrap();
            for (rel, content) in files {
                let path = dir.join(rel);
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(path, content).unwrap();
            }
            resolve(name, self.root.path(), &SystemFileSystemOps).unwrap()
        }

        fn context(
            &self,
            machine: MachineId,
        ) -> (Context, Arc<RecordingLog>, Arc<RecordingExecutor>) {
            let log = Arc::new(RecordingLog::default());
            let executor = Arc::new(RecordingExecutor::default());
            let ctx = make_context(self.root.path().to_path_buf(), machine)
                .with_log(log.clone())
                .with_executor(executor.clone())
                .with_env(Arc::new(home_env(self.home.path())));
            (ctx, log, executor)
        }

        fn home(&self) -> &Path {
            self.home.path()
        }
    }

    const ZSH: &str = r#"
name = "zsh"
[builds]
"*" = ["echo any"]
arch = ["echo arch"]

[[configs]]
from = "zshrc"
to = "~/.zshrc"
method = "copy"

[[configs]]
from = "arch.zsh"
to = "~/.config/zsh/arch.zsh"
method = "symlink"
tags = ["arch"]
"#;

    #[test]
    fn installs_matching_entries_only() {
        let fx = Fixture::new();
        let c = fx.component("zsh", ZSH, &[("zshrc", "rc"), ("arch.zsh", "a")]);
        let (ctx, log, _) = fx.context(MachineId::Fedora);

        execute(&InstallComponent::new(c), &ctx);

        assert_eq!(std::fs::read_to_string(fx.home().join(".zshrc")).unwrap(), "rc");
        assert!(!fx.home().join(".config/zsh/arch.zsh").exists());
        assert_eq!(log.outcomes(), vec![("zsh".to_string(), Outcome::Ok)]);
    }

    #[test]
    fn builds_run_before_configs_in_component_dir() {
        let fx = Fixture::new();
        let c = fx.component("zsh", ZSH, &[("zshrc", "rc"), ("arch.zsh", "a")]);
        let dir = c.dir.clone();
        let (ctx, _, executor) = fx.context(MachineId::Arch);

        execute(&InstallComponent::new(c), &ctx);

        assert_eq!(executor.commands(), vec!["echo arch"]);
        assert_eq!(executor.dirs(), vec![dir]);
        #[cfg(unix)]
        assert!(
            fx.home()
                .join(".config/zsh/arch.zsh")
                .symlink_metadata()
                .unwrap()
                .is_symlink()
        );
    }

    #[test]
    fn failed_build_still_places_configs_and_marks_failure() {
        let fx = Fixture::new();
        let c = fx.component("zsh", ZSH, &[("zshrc", "rc"), ("arch.zsh", "a")]);
        let log = Arc::new(RecordingLog::default());
        let ctx = fx
            .context(MachineId::Void)
            .0
            .with_log(log.clone())
            .with_executor(Arc::new(RecordingExecutor::failing_on("echo any")));

        execute(&InstallComponent::new(c), &ctx);

        assert!(fx.home().join(".zshrc").exists());
        assert_eq!(log.outcomes()[0].1, Outcome::Failed);
        assert!(log.errors().iter().any(|e| e.contains("build failed")));
    }

    #[test]
    fn existing_destination_is_skipped_without_force() {
        let fx = Fixture::new();
        let c = fx.component("zsh", ZSH, &[("zshrc", "rc"), ("arch.zsh", "a")]);
        std::fs::write(fx.home().join(".zshrc"), "mine").unwrap();
        let (ctx, log, _) = fx.context(MachineId::Debian);

        execute(&InstallComponent::new(c), &ctx);

        assert_eq!(std::fs::read_to_string(fx.home().join(".zshrc")).unwrap(), "mine");
        assert!(log.infos().iter().any(|m| m.contains("use --force")));
        assert_eq!(log.outcomes()[0].1, Outcome::Ok);
    }

    #[test]
    fn force_flag_overwrites_existing_destination() {
        let fx = Fixture::new();
        let c = fx.component("zsh", ZSH, &[("zshrc", "rc"), ("arch.zsh", "a")]);
        std::fs::write(fx.home().join(".zshrc"), "mine").unwrap();
        let (mut ctx, _, _) = fx.context(MachineId::Debian);
        ctx.force = true;

        execute(&InstallComponent::new(c), &ctx);

        assert_eq!(std::fs::read_to_string(fx.home().join(".zshrc")).unwrap(), "rc");
    }

    #[test]
    fn entry_force_overwrites_existing_directory() {
        let fx = Fixture::new();
        let manifest = r#"
name = "nvim"
[[configs]]
from = "init.lua"
to = "~/.config/nvim/init.lua"
method = "copy"
force = true
"#;
        let c = fx.component("nvim", manifest, &[("init.lua", "-- lua")]);
        std::fs::create_dir_all(fx.home().join(".config/nvim/init.lua/junk")).unwrap();
        let (ctx, _, _) = fx.context(MachineId::Arch);

        execute(&InstallComponent::new(c), &ctx);

        assert_eq!(
            std::fs::read_to_string(fx.home().join(".config/nvim/init.lua")).unwrap(),
            "-- lua"
        );
    }

    #[test]
    fn forced_symlink_onto_its_own_source_keeps_the_source() {
        let fx = Fixture::new();
        let source = fx.root.path().join("zsh").join("zshrc");
        let manifest = format!(
            "name = \"zsh\"\n[[configs]]\nfrom = \"zshrc\"\nto = '{}'\nmethod = \"symlink\"\nforce = true\n",
            source.display()
        );
        let c = fx.component("zsh", &manifest, &[("zshrc", "rc")]);
        let (mut ctx, log, _) = fx.context(MachineId::Arch);
        ctx.force = true;

        execute(&InstallComponent::new(c), &ctx);

        assert!(!source.symlink_metadata().unwrap().is_symlink());
        assert_eq!(std::fs::read_to_string(&source).unwrap(), "rc");
        assert_eq!(log.outcomes()[0].1, Outcome::Failed);
        assert!(log.errors().iter().any(|e| e.contains("overlaps source")));
    }

    #[test]
    fn dry_run_changes_nothing() {
        let fx = Fixture::new();
        let c = fx.component("zsh", ZSH, &[("zshrc", "rc"), ("arch.zsh", "a")]);
        let (mut ctx, log, executor) = fx.context(MachineId::Arch);
        ctx.dry_run = true;

        execute(&InstallComponent::new(c), &ctx);

        assert!(!fx.home().join(".zshrc").exists());
        assert!(executor.commands().is_empty());
        assert_eq!(log.outcomes()[0].1, Outcome::DryRun);
        assert!(log.dry_runs().iter().any(|m| m.contains("would run: echo arch")));
    }

    #[test]
    fn component_with_nothing_for_machine_is_not_applicable() {
        let fx = Fixture::new();
        let manifest = r#"
name = "mac"
[[configs]]
from = "f"
to = "~/f"
method = "copy"
tags = ["darwin"]
"#;
        let c = fx.component("mac", manifest, &[("f", "")]);
        let (ctx, log, _) = fx.context(MachineId::Ubuntu);

        execute(&InstallComponent::new(c), &ctx);

        assert_eq!(log.outcomes()[0].1, Outcome::NotApplicable);
    }
}
