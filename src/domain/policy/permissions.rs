// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::policy::document::{OneOrMany, PolicyDocument, Statement};
use crate::infrastructure::constants::{CONDITION_STRING_EQUALS, CONDITION_STRING_LIKE};

const VOLUME_ARN: &str = "arn:aws:ec2:*:*:volume/*";
const SNAPSHOT_ARN: &str = "arn:aws:ec2:*:*:snapshot/*";

fn allow(actions: &[&str]) -> Statement {
    Statement::allow(OneOrMany::many(actions.iter().copied()))
}

fn anywhere() -> OneOrMany<String> {
    OneOrMany::one("*")
}

fn volumes_and_snapshots() -> OneOrMany<String> {
    OneOrMany::many([VOLUME_ARN, SNAPSHOT_ARN])
}

/// Permissions the EBS CSI controller needs to manage volumes and snapshots.
pub fn ebs_csi_driver_policy() -> PolicyDocument {
    PolicyDocument::new(vec![
        allow(&[
            "ec2:CreateSnapshot",
            "ec2:AttachVolume",
            "ec2:DetachVolume",
            "ec2:ModifyVolume",
            "ec2:DescribeAvailabilityZones",
            "ec2:DescribeInstances",
            "ec2:DescribeSnapshots",
            "ec2:DescribeTags",
            "ec2:DescribeVolumes",
            "ec2:DescribeVolumesModifications",
        ])
        .on(anywhere()),
        allow(&["ec2:CreateTags"])
            .on(volumes_and_snapshots())
            .with_condition(
                CONDITION_STRING_EQUALS,
                "ec2:CreateAction",
                OneOrMany::many(["CreateVolume", "CreateSnapshot"]),
            ),
        allow(&["ec2:DeleteTags"]).on(volumes_and_snapshots()),
        allow(&["ec2:CreateVolume"]).on(anywhere()).with_condition(
            CONDITION_STRING_LIKE,
            "aws:RequestTag/ebs.csi.aws.com/cluster",
            OneOrMany::one("true"),
        ),
        allow(&["ec2:CreateVolume"]).on(anywhere()).with_condition(
            CONDITION_STRING_LIKE,
            "aws:RequestTag/CSIVolumeName",
            OneOrMany::one("*"),
        ),
        allow(&["ec2:DeleteVolume"]).on(anywhere()).with_condition(
            CONDITION_STRING_LIKE,
            "ec2:ResourceTag/CSIVolumeName",
            OneOrMany::one("*"),
        ),
        allow(&["ec2:DeleteVolume"]).on(anywhere()).with_condition(
            CONDITION_STRING_LIKE,
            "ec2:ResourceTag/ebs.csi.aws.com/cluster",
            OneOrMany::one("true"),
        ),
        allow(&["ec2:DeleteSnapshot"]).on(anywhere()).with_condition(
            CONDITION_STRING_LIKE,
            "ec2:ResourceTag/CSIVolumeSnapshotName",
            OneOrMany::one("*"),
        ),
        allow(&["ec2:DeleteSnapshot"]).on(anywhere()).with_condition(
            CONDITION_STRING_LIKE,
            "ec2:ResourceTag/ebs.csi.aws.com/cluster",
            OneOrMany::one("true"),
        ),
    ])
}
