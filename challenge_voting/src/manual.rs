/*!

This is the long-form manual for `challenge_voting` and `chtally`.

## The voting ledger

The input is the raw wikitext of a round's voting page: one section per
submitted image, votes as bullet lines underneath. A well-formed section
looks like this:

```text
===<span class="anchor" id="7">7</span>. Old oak.jpg===
[[File:Old oak.jpg|none|thumb|450px|Old oak in winter]]
<!-- '''Creator:''' [[User:Alice|Alice]] -->
* {{3/3*}} [[User:Bob|Bob]] 10:03, 2 September 2025 (UTC)
* {{0/3*}} [[Benutzer:Karl|Karl]] 11:40, 2 September 2025 (UTC)
```

The parser tolerates the variance real pages accumulate:

* entry numbers come from the anchor span, or from the legacy `===7.` form;
  a header with neither yields an entry that no vote can reference;
* the creator line may be live or still wrapped in the HTML comment used
  while voting is open;
* votes are recognized by the `{{N/3*}}` award template; `0` is a "highly
  commended" praise, `1`–`3` are 3rd/2nd/1st place;
* signatures may be plain user links (localized spellings included), or
  `Special:Contributions` links for anonymous voters; a vote line with no
  recognizable signature is kept and flagged as unsigned;
* everything under the `Sample-image.svg` how-to-vote section is ignored.

## The round label

Rounds are named `"<year> - <month-name> - <theme>"`, for example
`2025 - August - Bark`. Voting opens on day 30 of the submission month;
that instant anchors the account-age eligibility check.

## The identity directory

`chtally` reads account facts from a JSON file mapping voter names to
records:

```json
{
    "Alice": {
        "registrationDate": "2019-03-01",
        "editCount": 4021,
        "isBlocked": false,
        "contributions": ["Commons:Photo challenge/2025 - August - Bark"]
    },
    "Ghost": { "isRegistered": false }
}
```

All fields are optional. `hasDirectSubmission` may be given directly;
otherwise it is derived from the `contributions` titles (a direct challenge
page, not a sub-page). Names missing from the file are treated as not
registered — the same degradation applied when a lookup fails.

## Outputs

The audit writes, next to a JSON summary on stdout:

* `<label>_result.txt` — the result page: counts, the sortable score
  table, and the list of corrections the software applied;
* `<label>_winners.txt` — the winners-table template plus talk-page and
  announcement snippets;
* `<label>_revised.txt` — the voting page rewritten for the closed round;
* `<label>_votes.csv`, `<label>_files.csv`, `<label>_voters.csv` — the
  intermediate tables for audit.

 */
