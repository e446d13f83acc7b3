#[cfg(test)]
mod tests {
    use super::super::metadata::{BackupMetadata, METADATA_FILE};
    use super::super::{BackupEngine, EtcdctlEngine, RestoreEngine};
    use crate::cli::{BackupOptions, RestoreOptions};
    use crate::context::ExecutionContext;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_fake_etcdctl(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("etcdctl");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn backup_options(backup_dir: &Path) -> BackupOptions {
        BackupOptions {
            backup_dir: Some(backup_dir.to_path_buf()),
            ..Default::default()
        }
    }

    fn restore_options(backup_dir: &Path, data_dir: &Path) -> RestoreOptions {
        RestoreOptions {
            data_dir: data_dir.to_path_buf(),
            backup_dir: Some(backup_dir.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_save_args_plaintext() {
        let options = BackupOptions {
            endpoints: vec!["10.0.0.1:2379".into(), "10.0.0.2:2379".into()],
            ..backup_options(Path::new("/tmp/b"))
        };

        let args = EtcdctlEngine::snapshot_save_args(&options, Path::new("/tmp/b/snap.db"));
        assert_eq!(
            args,
            vec![
                "--endpoints=10.0.0.1:2379,10.0.0.2:2379",
                "snapshot",
                "save",
                "/tmp/b/snap.db"
            ]
        );
    }

    #[test]
    fn test_snapshot_save_args_tls() {
        let options = BackupOptions {
            cert: Some("/etc/etcd/peer.crt".into()),
            key: Some("/etc/etcd/peer.key".into()),
            cacert: Some("/etc/etcd/ca.crt".into()),
            ..backup_options(Path::new("/tmp/b"))
        };

        let args = EtcdctlEngine::snapshot_save_args(&options, Path::new("/tmp/b/snap.db"));
        assert_eq!(args[1], "--cert=/etc/etcd/peer.crt");
        assert_eq!(args[2], "--key=/etc/etcd/peer.key");
        assert_eq!(args[3], "--cacert=/etc/etcd/ca.crt");
        assert_eq!(args.last().unwrap(), "/tmp/b/snap.db");
    }

    #[test]
    fn test_snapshot_restore_args() {
        let args = EtcdctlEngine::snapshot_restore_args(
            Path::new("/tmp/b/snap.db"),
            Path::new("/var/lib/etcd"),
        );
        assert_eq!(
            args,
            vec![
                "snapshot",
                "restore",
                "/tmp/b/snap.db",
                "--data-dir",
                "/var/lib/etcd"
            ]
        );
    }

    #[tokio::test]
    async fn test_backup_writes_snapshot_and_metadata() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backup");
        let program = write_fake_etcdctl(
            temp.path(),
            "for last; do :; done\necho \"$ETCDCTL_API\" > \"$(dirname \"$last\")/api.txt\"\nprintf snapshot > \"$last\"",
        );

        let engine = EtcdctlEngine::with_program(&program);
        engine.backup(&backup_options(&backup_dir)).await.unwrap();

        let metadata = BackupMetadata::load(&backup_dir).unwrap().unwrap();
        assert!(metadata.snapshot.starts_with("snapshot_"));
        assert_eq!(metadata.endpoints, vec!["127.0.0.1:2379"]);
        assert_eq!(
            fs::read_to_string(backup_dir.join(&metadata.snapshot)).unwrap(),
            "snapshot"
        );
        assert_eq!(
            fs::read_to_string(backup_dir.join("api.txt")).unwrap().trim(),
            "3"
        );
    }

    #[tokio::test]
    async fn test_backup_reports_etcdctl_failure() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backup");
        let program = write_fake_etcdctl(
            temp.path(),
            "echo 'context deadline exceeded' >&2\nexit 1",
        );

        let engine = EtcdctlEngine::with_program(&program);
        let err = engine
            .backup(&backup_options(&backup_dir))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("context deadline exceeded"));
        assert!(!backup_dir.join(METADATA_FILE).exists());
    }

    #[tokio::test]
    async fn test_backup_missing_program() {
        let temp = TempDir::new().unwrap();
        let engine = EtcdctlEngine::with_program(temp.path().join("missing-etcdctl"));

        let err = engine
            .backup(&backup_options(&temp.path().join("backup")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to run"));
    }

    #[tokio::test]
    async fn test_restore_runs_etcdctl() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backup");
        fs::create_dir_all(&backup_dir).unwrap();
        fs::write(backup_dir.join("snapshot_2024-05-01_101500.db"), b"snap").unwrap();
        let data_dir = temp.path().join("etcd");
        let args_file = temp.path().join("args.txt");
        let program = write_fake_etcdctl(
            temp.path(),
            &format!("echo \"$@\" > '{}'", args_file.display()),
        );

        let engine = EtcdctlEngine::with_program(&program);
        engine
            .restore(&ExecutionContext::new(), &restore_options(&backup_dir, &data_dir))
            .await
            .unwrap();

        let recorded = fs::read_to_string(&args_file).unwrap();
        assert_eq!(
            recorded.trim(),
            format!(
                "snapshot restore {} --data-dir {}",
                backup_dir.join("snapshot_2024-05-01_101500.db").display(),
                data_dir.display()
            )
        );
    }

    #[tokio::test]
    async fn test_restore_refuses_non_empty_data_dir() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backup");
        fs::create_dir_all(&backup_dir).unwrap();
        fs::write(backup_dir.join("snapshot_2024-05-01_101500.db"), b"snap").unwrap();
        let data_dir = temp.path().join("etcd");
        fs::create_dir_all(data_dir.join("member")).unwrap();

        let engine = EtcdctlEngine::with_program(temp.path().join("unused"));
        let err = engine
            .restore(&ExecutionContext::new(), &restore_options(&backup_dir, &data_dir))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("is not empty"));
    }

    #[tokio::test]
    async fn test_restore_reports_etcdctl_failure() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backup");
        fs::create_dir_all(&backup_dir).unwrap();
        fs::write(backup_dir.join("snapshot_2024-05-01_101500.db"), b"snap").unwrap();
        let program = write_fake_etcdctl(temp.path(), "exit 2");

        let engine = EtcdctlEngine::with_program(&program);
        let err = engine
            .restore(
                &ExecutionContext::new(),
                &restore_options(&backup_dir, &temp.path().join("etcd")),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("etcdctl snapshot restore failed"));
    }

    #[tokio::test]
    async fn test_restore_aborts_on_cancel() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backup");
        fs::create_dir_all(&backup_dir).unwrap();
        fs::write(backup_dir.join("snapshot_2024-05-01_101500.db"), b"snap").unwrap();
        let program = write_fake_etcdctl(temp.path(), "exec sleep 30");

        let engine =
            EtcdctlEngine::with_program(&program).with_grace_period(Duration::from_secs(1));
        let ctx = ExecutionContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            canceller.cancel();
        });

        let options = restore_options(&backup_dir, &temp.path().join("etcd"));
        let err = tokio::time::timeout(Duration::from_secs(10), engine.restore(&ctx, &options))
            .await
            .unwrap()
            .unwrap_err();

        assert_eq!(err.to_string(), "restore cancelled by interrupt");
    }

    #[tokio::test]
    async fn test_restore_skips_etcdctl_when_already_cancelled() {
        let temp = TempDir::new().unwrap();
        let backup_dir = temp.path().join("backup");
        fs::create_dir_all(&backup_dir).unwrap();
        fs::write(backup_dir.join("snapshot_2024-05-01_101500.db"), b"snap").unwrap();

        let ctx = ExecutionContext::new();
        ctx.cancel();

        let engine = EtcdctlEngine::with_program(temp.path().join("unused"));
        let err = engine
            .restore(&ctx, &restore_options(&backup_dir, &temp.path().join("etcd")))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "restore cancelled by interrupt");
    }
}
