//! Integration tests for installer reconciliation.

use installer_insight::core::InstallerRecord;
use installer_insight::reconcile::{inherit_matched, match_installers};
use installer_insight::{Architecture, InstallerType, Scope};

fn rec(url: &str, arch: Architecture) -> InstallerRecord {
    InstallerRecord::new(url, arch)
}

#[test]
fn test_user_and_machine_collapse_onto_scope_less_candidate() {
    let previous = vec![
        rec("https://e.com/1.0/app-user.exe", Architecture::X86)
            .with_type(InstallerType::Nullsoft)
            .with_scope(Scope::User),
        rec("https://e.com/1.0/app-machine.exe", Architecture::X86)
            .with_type(InstallerType::Nullsoft)
            .with_scope(Scope::Machine),
    ];
    let candidates = vec![
        rec("https://e.com/2.0/app-user.exe", Architecture::X86)
            .with_type(InstallerType::Nullsoft)
            .with_scope(Scope::User),
        rec("https://e.com/2.0/app.exe", Architecture::X86).with_type(InstallerType::Nullsoft),
    ];
    let mapping = match_installers(&previous, &candidates);
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping[&0], 0);
    assert_eq!(mapping[&1], 1);
}

#[test]
fn test_url_extension_is_last_resort() {
    let previous = vec![
        rec("https://e.com/1.0/app-arm64.msi", Architecture::Arm64).with_type(InstallerType::Msi),
        rec("https://e.com/1.0/app-x64.exe", Architecture::X64).with_type(InstallerType::Inno),
    ];
    let candidates = vec![
        rec("https://e.com/2.0/app-arm64.msi", Architecture::Arm64).with_type(InstallerType::Msi),
        rec("https://e.com/2.0/app.exe", Architecture::X86).with_type(InstallerType::Nullsoft),
    ];
    let mapping = match_installers(&previous, &candidates);
    assert_eq!(mapping[&0], 0);
    assert_eq!(mapping[&1], 1);
}

#[test]
fn test_first_candidate_in_order_wins() {
    let previous = vec![rec("a.exe", Architecture::X64).with_type(InstallerType::Burn)];
    let candidates = vec![
        rec("b.exe", Architecture::Arm64).with_type(InstallerType::Burn),
        rec("c.exe", Architecture::X86).with_type(InstallerType::Burn),
    ];
    assert_eq!(match_installers(&previous, &candidates)[&0], 0);
}

#[test]
fn test_mapping_bounds() {
    let previous: Vec<InstallerRecord> = [Architecture::X86, Architecture::X64, Architecture::Arm64]
        .into_iter()
        .map(|a| rec("https://e.com/a.msi", a).with_type(InstallerType::Msi))
        .collect();
    let candidates = vec![rec("https://e.com/b.msi", Architecture::X64).with_type(InstallerType::Msi)];
    let mapping = match_installers(&previous, &candidates);
    assert!(mapping.len() <= previous.len());
    assert!(mapping.values().all(|&c| c < candidates.len()));
    assert!(match_installers(&[], &[]).is_empty());
}

#[test]
fn test_inputs_are_not_mutated() {
    let previous = vec![rec("a.exe", Architecture::X64).with_scope(Scope::User)];
    let candidates = vec![rec("b.exe", Architecture::X64)];
    let before = (previous.clone(), candidates.clone());
    let _ = match_installers(&previous, &candidates);
    let merged = inherit_matched(&previous, &candidates);
    assert_eq!((previous, candidates), before);
    assert_eq!(merged[0].scope, Some(Scope::User));
}
