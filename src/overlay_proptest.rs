//! Property-based tests for the file synchronizer.
//!
//! These tests generate random template stores and target trees and verify
//! that the synchronizer's invariants hold: syncs reach a fixed point,
//! the alternate overlay wins collisions, denylisted paths disappear
//! unless the overlays rebuild them, and unrelated files survive.

#[cfg(test)]
mod proptest_tests {
    use crate::config::{
        TemplateStore, BASE_OVERLAY_DIR, DENYLIST_FILE, FIELDS_FILE, PNPM_OVERLAY_DIR,
    };
    use crate::overlay;
    use crate::target::PackageManager;
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Where a generated file lives in the scenario.
    const ROLE_BASE: u8 = 0;
    const ROLE_PNPM: u8 = 1;
    const ROLE_BOTH: u8 = 2;
    const ROLE_JUNK: u8 = 3;
    const ROLE_DENYLISTED: u8 = 4;
    /// Base overlay file whose top-level directory is denylisted; every
    /// sync removes that directory and the overlay copy rebuilds it.
    const ROLE_DENYLISTED_DIR: u8 = 5;

    /// Random relative paths with role assignments, filtered so no path is
    /// a directory prefix of another (those cannot coexist on disk), and so
    /// a rebuilt-directory path owns its top-level directory outright.
    fn scenario() -> impl Strategy<Value = Vec<(String, String, u8)>> {
        let rel_path = proptest::collection::vec("[a-z]{1,8}", 1..4usize)
            .prop_map(|parts| parts.join("/"));
        proptest::collection::vec((rel_path, "[a-z0-9 ]{0,32}", 0..6u8), 0..12usize).prop_map(
            |files| {
                let mut kept: Vec<(String, String, u8)> = Vec::new();
                'outer: for (path, content, role) in files {
                    for (existing, _, _) in &kept {
                        if *existing == path
                            || existing.starts_with(&format!("{}/", path))
                            || path.starts_with(&format!("{}/", existing))
                        {
                            continue 'outer;
                        }
                    }
                    kept.push((path, content, role));
                }
                // Removing a rebuilt directory takes everything under its
                // top-level component with it, so the role only applies to
                // nested paths sharing that component with nobody else.
                for i in 0..kept.len() {
                    if kept[i].2 != ROLE_DENYLISTED_DIR {
                        continue;
                    }
                    let top = top_component(&kept[i].0).to_string();
                    let owns_top = kept[i].0.contains('/')
                        && kept.iter().enumerate().all(|(j, (other, _, _))| {
                            j == i || top_component(other) != top.as_str()
                        });
                    if !owns_top {
                        kept[i].2 = ROLE_BASE;
                    }
                }
                kept
            },
        )
    }

    /// Leading path component, the directory a denylist entry names.
    fn top_component(path: &str) -> &str {
        path.split('/').next().unwrap()
    }

    fn write_file(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Build the template store for a scenario.
    fn build_store(temp: &Path, files: &[(String, String, u8)]) -> TemplateStore {
        let templates = temp.join("templates");
        fs::create_dir_all(templates.join(BASE_OVERLAY_DIR)).unwrap();
        fs::create_dir_all(templates.join(PNPM_OVERLAY_DIR)).unwrap();

        let mut denylist = Vec::new();
        for (path, content, role) in files {
            match *role {
                ROLE_BASE => {
                    write_file(&templates.join(BASE_OVERLAY_DIR), path, content);
                }
                ROLE_PNPM => {
                    write_file(
                        &templates.join(PNPM_OVERLAY_DIR),
                        path,
                        &format!("{}#pnpm", content),
                    );
                }
                ROLE_BOTH => {
                    write_file(&templates.join(BASE_OVERLAY_DIR), path, content);
                    write_file(
                        &templates.join(PNPM_OVERLAY_DIR),
                        path,
                        &format!("{}#pnpm", content),
                    );
                }
                ROLE_DENYLISTED => denylist.push(path.clone()),
                ROLE_DENYLISTED_DIR => {
                    write_file(&templates.join(BASE_OVERLAY_DIR), path, content);
                    denylist.push(top_component(path).to_string());
                }
                _ => {}
            }
        }

        fs::write(templates.join(DENYLIST_FILE), denylist.join("\n")).unwrap();
        fs::write(templates.join(FIELDS_FILE), "{}").unwrap();
        TemplateStore::load(&templates).unwrap()
    }

    /// Build a target holding the scenario's junk and denylisted files.
    fn build_target(temp: &Path, name: &str, files: &[(String, String, u8)]) -> PathBuf {
        let target = temp.join(name);
        fs::create_dir_all(&target).unwrap();
        for (path, content, role) in files {
            match *role {
                ROLE_JUNK => write_file(&target, path, &format!("{}#junk", content)),
                ROLE_DENYLISTED => write_file(&target, path, content),
                _ => {}
            }
        }
        target
    }

    /// Relative path -> bytes for every file under `dir`.
    fn tree_snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
        let mut map = BTreeMap::new();
        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.unwrap();
            if entry.file_type().is_file() {
                let rel = entry
                    .path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned();
                map.insert(rel, fs::read(entry.path()).unwrap());
            }
        }
        map
    }

    proptest! {
        /// Property: a second sync changes nothing, on disk or in the stats.
        #[test]
        fn sync_reaches_a_fixed_point(files in scenario()) {
            let temp = TempDir::new().unwrap();
            let store = build_store(temp.path(), &files);
            let target = build_target(temp.path(), "target", &files);

            overlay::sync(&target, &store, PackageManager::Pnpm).unwrap();
            let after_first = tree_snapshot(&target);

            let second = overlay::sync(&target, &store, PackageManager::Pnpm).unwrap();
            prop_assert!(!second.changed);
            // Rebuilt directories are torn down and recreated on every
            // run, which is physical work but not change.
            let rebuilt = files
                .iter()
                .filter(|(_, _, role)| *role == ROLE_DENYLISTED_DIR)
                .count();
            prop_assert_eq!(second.removed, rebuilt);
            prop_assert_eq!(second.copied, rebuilt);
            prop_assert_eq!(tree_snapshot(&target), after_first);

            let plan = overlay::plan(&target, &store, PackageManager::Pnpm).unwrap();
            prop_assert!(plan.is_empty());
        }

        /// Property: after a pnpm sync every collision holds the alternate
        /// overlay's bytes; after an npm sync the alternate overlay never
        /// applies at all.
        #[test]
        fn alternate_overlay_wins_exactly_for_pnpm(files in scenario()) {
            let temp = TempDir::new().unwrap();
            let store = build_store(temp.path(), &files);

            let pnpm_target = build_target(temp.path(), "pnpm-target", &files);
            overlay::sync(&pnpm_target, &store, PackageManager::Pnpm).unwrap();

            let npm_target = build_target(temp.path(), "npm-target", &files);
            overlay::sync(&npm_target, &store, PackageManager::Npm).unwrap();

            for (path, content, role) in &files {
                match *role {
                    ROLE_BASE | ROLE_DENYLISTED_DIR => {
                        prop_assert_eq!(
                            &fs::read_to_string(pnpm_target.join(path)).unwrap(),
                            content
                        );
                        prop_assert_eq!(
                            &fs::read_to_string(npm_target.join(path)).unwrap(),
                            content
                        );
                    }
                    ROLE_PNPM => {
                        prop_assert_eq!(
                            fs::read_to_string(pnpm_target.join(path)).unwrap(),
                            format!("{}#pnpm", content)
                        );
                        prop_assert!(!npm_target.join(path).exists());
                    }
                    ROLE_BOTH => {
                        prop_assert_eq!(
                            fs::read_to_string(pnpm_target.join(path)).unwrap(),
                            format!("{}#pnpm", content)
                        );
                        prop_assert_eq!(
                            &fs::read_to_string(npm_target.join(path)).unwrap(),
                            content
                        );
                    }
                    _ => {}
                }
            }
        }

        /// Property: denylisted paths are gone after a sync, while files the
        /// store knows nothing about survive untouched.
        #[test]
        fn denylist_removes_and_junk_survives(files in scenario()) {
            let temp = TempDir::new().unwrap();
            let store = build_store(temp.path(), &files);
            let target = build_target(temp.path(), "target", &files);

            overlay::sync(&target, &store, PackageManager::Pnpm).unwrap();

            for (path, content, role) in &files {
                match *role {
                    ROLE_DENYLISTED => prop_assert!(!target.join(path).exists()),
                    ROLE_DENYLISTED_DIR => {
                        // The denylist deletes the directory, then the
                        // overlay copy puts the file back.
                        prop_assert_eq!(
                            &fs::read_to_string(target.join(path)).unwrap(),
                            content
                        );
                    }
                    ROLE_JUNK => {
                        prop_assert_eq!(
                            fs::read_to_string(target.join(path)).unwrap(),
                            format!("{}#junk", content)
                        );
                    }
                    _ => {}
                }
            }
        }

        /// Property: the plan's emptiness agrees with the sync's verdict.
        #[test]
        fn plan_verdict_matches_sync(files in scenario()) {
            let temp = TempDir::new().unwrap();
            let store = build_store(temp.path(), &files);
            let target = build_target(temp.path(), "target", &files);

            let planned = overlay::plan(&target, &store, PackageManager::Pnpm).unwrap();
            let stats = overlay::sync(&target, &store, PackageManager::Pnpm).unwrap();
            prop_assert_eq!(stats.changed, !planned.is_empty());
        }
    }
}
